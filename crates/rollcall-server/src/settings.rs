//! Server configuration: an optional TOML file overlaid with `ROLLCALL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  /// Origin that resolved artifact URLs point at. Defaults to
  /// `http://<host>:<port>`.
  pub public_base_url:    Option<String>,
  pub record_store_path:  PathBuf,
  pub artifact_dir:       PathBuf,
  pub auth_username:      String,
  /// PHC string from `rollcall-server --hash-password`.
  pub auth_password_hash: String,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080)?
      .set_default("record_store_path", "~/.local/share/rollcall/records.db")?
      .set_default("artifact_dir", "~/.local/share/rollcall/artifacts")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROLLCALL"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn public_base_url(&self) -> String {
    self
      .public_base_url
      .clone()
      .unwrap_or_else(|| format!("http://{}", self.address()))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
