//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rollcall_core::{
  record::{NewRecord, RecordId, SubjectRecord},
  store::RecordStore,
};

use crate::{
  Result,
  encode::{RECORD_COLUMNS, RawRecord, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Rollcall record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewRecord) -> Result<SubjectRecord> {
    let record = SubjectRecord {
      record_id:    Uuid::new_v4(),
      subject_name: input.subject_name,
      subject_id:   input.subject_id,
      artifact_key: input.artifact_key,
      // Stored with microsecond precision; truncate so the returned value
      // matches what a later read yields.
      created_at:   Utc::now().trunc_subsecs(6),
    };

    let id_str       = encode_uuid(record.record_id);
    let name         = record.subject_name.clone();
    let subject_id   = record.subject_id.clone();
    let artifact_key = record.artifact_key.clone();
    let at_str       = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (record_id, subject_name, subject_id, artifact_key, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, subject_id, artifact_key, at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(record_id = %record.record_id, subject_id = %record.subject_id, "record created");
    Ok(record)
  }

  async fn get(&self, record_id: RecordId) -> Result<Option<SubjectRecord>> {
    let id_str = encode_uuid(record_id);

    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM records WHERE record_id = ?1"),
            rusqlite::params![id_str],
            RawRecord::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }

  async fn list(&self) -> Result<Vec<SubjectRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM records
           ORDER BY subject_id ASC, created_at ASC, record_id ASC"
        ))?;
        let rows = stmt
          .query_map([], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn delete(&self, record_id: RecordId) -> Result<bool> {
    let id_str = encode_uuid(record_id);

    let removed = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "DELETE FROM records WHERE record_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n > 0)
      })
      .await?;

    tracing::debug!(%record_id, removed, "record delete");
    Ok(removed)
  }
}
