//! [`FsArtifactStore`]: the filesystem implementation of [`ArtifactStore`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
};

use rollcall_core::{
  store::{ArtifactStore, Resolution},
  token::validate_artifact_key,
};
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// Hex characters of the content digest used as the URL cache-buster.
const VERSION_LEN: usize = 16;

/// Stores each artifact as a file at `<root>/<key>`.
///
/// Resolved URLs point at `<public_base_url>/artifacts/<key>?v=<digest>`, the
/// route the API server uses to serve artifact bytes. The `v` parameter
/// changes whenever the stored content changes.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
  root:     PathBuf,
  base_url: Url,
}

impl FsArtifactStore {
  /// Open (or create) a store rooted at `root`.
  pub async fn open(root: impl Into<PathBuf>, public_base_url: &str) -> Result<Self> {
    let root = root.into();
    let base_url = Url::parse(public_base_url)?;
    if base_url.cannot_be_a_base() {
      return Err(Error::OpaqueBaseUrl(public_base_url.to_owned()));
    }
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(|source| Error::Io { path: root.clone(), source })?;
    Ok(Self { root, base_url })
  }

  pub fn root(&self) -> &Path { &self.root }

  fn path_for(&self, key: &str) -> Result<PathBuf> {
    validate_artifact_key(key)?;
    Ok(key.split('/').fold(self.root.clone(), |p, seg| p.join(seg)))
  }

  fn url_for(&self, key: &str, content: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(content));
    let mut url = self.base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments
        .pop_if_empty()
        .push("artifacts")
        .extend(key.split('/'));
    }
    url
      .query_pairs_mut()
      .clear()
      .append_pair("v", &digest[..VERSION_LEN]);
    url.into()
  }

  /// Read a file, mapping "not found" to `None`. Invalid keys can never have
  /// been written, so they read as absent too.
  async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
    let Ok(path) = self.path_for(key) else {
      return Ok(None);
    };
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(source) => Err(Error::Io { path, source }),
    }
  }
}

// ─── ArtifactStore impl ──────────────────────────────────────────────────────

impl ArtifactStore for FsArtifactStore {
  type Error = Error;

  async fn put(&self, key: &str, blob: Vec<u8>) -> Result<()> {
    let path = self.path_for(key)?;
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| Error::Io { path: parent.to_path_buf(), source })?;
    }

    // Write-then-rename so readers never observe a partial file. Each write
    // has its own temp file; concurrent puts to one key each rename whole.
    let tmp = temp_path(&path);
    if let Err(source) = tokio::fs::write(&tmp, &blob).await {
      tokio::fs::remove_file(&tmp).await.ok();
      return Err(Error::Io { path: tmp, source });
    }
    if let Err(source) = tokio::fs::rename(&tmp, &path).await {
      tokio::fs::remove_file(&tmp).await.ok();
      return Err(Error::Io { path, source });
    }

    tracing::debug!(key, bytes = blob.len(), "artifact stored");
    Ok(())
  }

  async fn resolve(&self, key: &str) -> Result<Resolution> {
    Ok(match self.read(key).await? {
      Some(content) => Resolution::Found(self.url_for(key, &content)),
      None => Resolution::NotFound,
    })
  }

  async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> { self.read(key).await }

  async fn keys(&self) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut pending = vec![(self.root.clone(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
      let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|source| Error::Io { path: dir.clone(), source })?;
      while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|source| Error::Io { path: dir.clone(), source })?
      {
        let name = entry.file_name().to_string_lossy().into_owned();
        // In-flight temp files from `put`.
        if name.starts_with('.') && name.ends_with(".tmp") {
          continue;
        }
        let key = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };
        let file_type = entry
          .file_type()
          .await
          .map_err(|source| Error::Io { path: entry.path(), source })?;
        if file_type.is_dir() {
          pending.push((entry.path(), key));
        } else if file_type.is_file() {
          keys.push(key);
        }
      }
    }

    keys.sort();
    Ok(keys)
  }
}

/// `<dir>/.<file>.<uuid>.tmp` next to the final path, unique per write.
fn temp_path(path: &Path) -> PathBuf {
  let name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_default();
  path.with_file_name(format!(".{name}.{}.tmp", Uuid::new_v4().simple()))
}
