//! Read models assembled by the roster view. Never stored, always derived.

use serde::{Deserialize, Serialize};

use crate::record::{RecordId, SubjectRecord};

/// What the roster knows about a record's artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtifactStatus {
  Available { url: String },
  /// The artifact store has nothing under the record's key.
  Missing,
  /// Resolution failed; the artifact may or may not exist.
  Unavailable { reason: String },
}

/// A record joined with its resolved artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
  pub record:   SubjectRecord,
  pub artifact: ArtifactStatus,
}

impl RosterEntry {
  /// The download URL, or `None` when the artifact cannot be shown.
  pub fn artifact_url(&self) -> Option<&str> {
    match &self.artifact {
      ArtifactStatus::Available { url } => Some(url),
      ArtifactStatus::Missing | ArtifactStatus::Unavailable { .. } => None,
    }
  }
}

/// Result of comparing the record store against the artifact store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
  /// Artifact keys no record refers to.
  pub orphaned_artifacts: Vec<String>,
  /// Records whose artifact key has nothing stored under it.
  pub missing_artifacts:  Vec<RecordId>,
}

impl Reconciliation {
  pub fn is_consistent(&self) -> bool {
    self.orphaned_artifacts.is_empty() && self.missing_artifacts.is_empty()
  }
}
