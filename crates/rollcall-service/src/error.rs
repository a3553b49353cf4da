//! Error types for the issuance and roster workflows.

use std::{fmt, sync::Arc};

use thiserror::Error;

/// A store error shared between every caller of a coalesced refresh.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Which half of the two-store write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
  Artifact,
  Record,
}

impl fmt::Display for WriteStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Artifact => "artifact",
      Self::Record => "record",
    })
  }
}

#[derive(Debug, Error)]
pub enum IssueError {
  #[error("no operator is signed in")]
  Unauthorized,

  /// Bad input; nothing was written.
  #[error("invalid input: {0}")]
  Validation(#[source] rollcall_core::Error),

  /// The payload could not be encoded; nothing was written.
  #[error("could not encode token: {0}")]
  Encoding(#[source] rollcall_token::Error),

  /// A store write failed. When `stage` is [`WriteStage::Record`] the
  /// artifact at `orphaned_artifact` was already written and is left in
  /// place.
  #[error("failed to write {stage}: {source}")]
  StoreWrite {
    stage:             WriteStage,
    orphaned_artifact: Option<String>,
    #[source]
    source:            Box<dyn std::error::Error + Send + Sync>,
  },
}

#[derive(Debug, Clone, Error)]
pub enum RosterError {
  #[error("no operator is signed in")]
  Unauthorized,

  #[error("failed to read store: {0}")]
  StoreRead(#[source] SharedError),

  #[error("failed to delete record: {0}")]
  StoreWrite(#[source] SharedError),
}
