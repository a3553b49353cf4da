//! rollcall-server binary.
//!
//! Reads `rollcall.toml` (or the path given with `--config`) plus `ROLLCALL_*`
//! environment overrides, opens the SQLite record store and the filesystem
//! artifact store, and serves the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `auth_password_hash`:
//!
//! ```text
//! cargo run -p rollcall-server -- --hash-password
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use rollcall_api::{AppState, auth::AuthConfig};
use rollcall_artifact_fs::FsArtifactStore;
use rollcall_store_sqlite::SqliteStore;
use rollcall_token::TokenEncoder;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::{ServerConfig, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Rollcall token issuance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rollcall.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = expand_tilde(&server_cfg.record_store_path);
  if let Some(parent) = store_path.parent() {
    tokio::fs::create_dir_all(parent)
      .await
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let records = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open record store at {store_path:?}"))?;

  let artifact_dir = expand_tilde(&server_cfg.artifact_dir);
  let public_base_url = server_cfg.public_base_url();
  let artifacts = FsArtifactStore::open(&artifact_dir, &public_base_url)
    .await
    .with_context(|| format!("failed to open artifact store at {artifact_dir:?}"))?;

  let state = AppState::new(
    Arc::new(records),
    Arc::new(artifacts),
    TokenEncoder::default(),
    AuthConfig {
      username:      server_cfg.auth_username.clone(),
      password_hash: server_cfg.auth_password_hash.clone(),
    },
  );

  let app = rollcall_api::router(state);
  let address = server_cfg.address();

  tracing::info!(
    records = ?store_path,
    artifacts = ?artifact_dir,
    %public_base_url,
    "stores opened"
  );
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}
