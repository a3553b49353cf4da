//! Filesystem backend for the Rollcall artifact store.
//!
//! Artifacts are plain files under a root directory, addressed by their
//! `/`-separated key. No binary data lives in the record database.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::FsArtifactStore;
