//! Subject records: the metadata half of an issued token.
//!
//! A record is written once by the issuance workflow and never updated. The
//! only lifecycle event is deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned, opaque record identifier.
pub type RecordId = Uuid;

/// Persisted metadata for one issued token.
///
/// `subject_id` is supplied by the operator and is *not* unique: issuing the
/// same subject twice yields two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
  pub record_id:    RecordId,
  pub subject_name: String,
  pub subject_id:   String,
  /// Path of the rendered artifact inside the artifact store.
  pub artifact_key: String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::RecordStore::create`].
/// `record_id` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
  pub subject_name: String,
  pub subject_id:   String,
  pub artifact_key: String,
}
