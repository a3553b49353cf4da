//! Connection settings: flags and `ROLLCALL_*` env vars over an optional TOML
//! file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::client::ApiConfig;

const DEFAULT_URL: &str = "http://localhost:8080";

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default, Debug)]
pub struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

impl ConfigFile {
  pub fn read(path: &Path) -> Result<Self> {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")
  }

  /// CLI flags override the config file, which overrides defaults.
  pub fn resolve(
    self,
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
  ) -> ApiConfig {
    ApiConfig {
      base_url: url
        .or_else(|| non_empty(self.url))
        .unwrap_or_else(|| DEFAULT_URL.to_string()),
      username: user.or_else(|| non_empty(self.username)).unwrap_or_default(),
      password: password
        .or_else(|| non_empty(self.password))
        .unwrap_or_default(),
    }
  }
}

fn non_empty(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn flags_override_file() {
    let file: ConfigFile = toml::from_str(
      r#"
url      = "http://rollcall.internal:9000"
username = "ops"
password = "from-file"
"#,
    )
    .unwrap();
    let config = file.resolve(None, None, Some("from-flag".to_string()));
    assert_eq!(config.base_url, "http://rollcall.internal:9000");
    assert_eq!(config.username, "ops");
    assert_eq!(config.password, "from-flag");
  }

  #[test]
  fn defaults_without_file() {
    let config = ConfigFile::default().resolve(None, None, None);
    assert_eq!(config.base_url, DEFAULT_URL);
    assert!(config.username.is_empty());
  }

  #[test]
  fn reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "username = \"ops\"\n").unwrap();
    let config = ConfigFile::read(&path).unwrap().resolve(None, None, None);
    assert_eq!(config.username, "ops");
    assert_eq!(config.base_url, DEFAULT_URL);
  }

  #[test]
  fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ConfigFile::read(&dir.path().join("nope.toml")).is_err());
  }
}
