//! Error types for `rollcall-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("subject id {0:?} must not contain '/', '\\' or NUL")]
  InvalidSubjectId(String),

  #[error("invalid artifact key: {0:?}")]
  InvalidArtifactKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
