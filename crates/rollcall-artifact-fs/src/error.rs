//! Error type for `rollcall-artifact-fs`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Key(#[from] rollcall_core::Error),

  #[error("invalid public base url: {0}")]
  BaseUrl(#[from] url::ParseError),

  #[error("public base url {0:?} cannot carry a path")]
  OpaqueBaseUrl(String),

  #[error("io error at {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
