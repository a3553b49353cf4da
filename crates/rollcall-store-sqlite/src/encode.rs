//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with microsecond precision so
//! they sort lexically. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use rollcall_core::record::SubjectRecord;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawRecord`].
pub const RECORD_COLUMNS: &str =
  "record_id, subject_name, subject_id, artifact_key, created_at";

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:    String,
  pub subject_name: String,
  pub subject_id:   String,
  pub artifact_key: String,
  pub created_at:   String,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:    row.get(0)?,
      subject_name: row.get(1)?,
      subject_id:   row.get(2)?,
      artifact_key: row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<SubjectRecord> {
    Ok(SubjectRecord {
      record_id:    decode_uuid(&self.record_id)?,
      subject_name: self.subject_name,
      subject_id:   self.subject_id,
      artifact_key: self.artifact_key,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_roundtrip_at_microsecond_precision() {
    let dt = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
    let encoded = encode_dt(dt);
    assert_eq!(encoded, "2023-11-14T22:13:20.123456Z");
    assert_eq!(decode_dt(&encoded).unwrap(), dt);
  }

  #[test]
  fn bad_timestamp_is_an_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
