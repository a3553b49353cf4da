//! `rollcall`: operator CLI for the Rollcall token server.
//!
//! # Usage
//!
//! ```text
//! rollcall --url http://localhost:8080 --user ops --password secret list
//! rollcall --config ~/.config/rollcall/config.toml issue "Ada Lovelace" S100
//! ```

mod client;
mod settings;

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use clap::{Parser, Subcommand};
use client::ApiClient;
use rollcall_core::roster::{ArtifactStatus, RosterEntry};
use rollcall_service::{DeleteOutcome, DeletePrompt, download::download_filename};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rollcall", about = "Issue and manage Rollcall QR tokens")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the Rollcall server (default: http://localhost:8080).
  #[arg(long, env = "ROLLCALL_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "ROLLCALL_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "ROLLCALL_PASSWORD")]
  password: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Issue a token and save its PNG.
  Issue {
    name: String,
    id:   String,
    /// Directory to save `student_<id>_qrcode.png` into.
    #[arg(long, default_value = ".")]
    out:  PathBuf,
  },
  /// Show the roster, ordered by subject id.
  List,
  /// Delete a record. Its stored PNG is left in place.
  Delete {
    record_id: Uuid,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes:       bool,
  },
  /// Fetch a subject's stored PNG.
  Download {
    subject_id: String,
    #[arg(long, default_value = ".")]
    out:        PathBuf,
  },
  /// Report artifacts without records and records without artifacts.
  Reconcile,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg = match &args.config {
    Some(path) => settings::ConfigFile::read(path)?,
    None => settings::ConfigFile::default(),
  };
  let api_config = file_cfg.resolve(args.url, args.user, args.password);
  tracing::debug!(url = %api_config.base_url, "connecting");

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Issue { name, id, out } => {
      let issued = client.issue(&name, &id).await?;
      let png = decode_data_uri(&issued.artifact.data_uri)?;
      let path = save(&out, &issued.artifact.filename, &png)?;
      println!("issued {} ({})", issued.record.subject_id, issued.record.record_id);
      println!("payload {}", issued.canonical);
      println!("saved   {}", path.display());
    }
    Command::List => {
      let roster = client.roster().await?;
      if roster.is_empty() {
        println!("no records");
      }
      for entry in &roster {
        println!("{}", roster_line(entry));
      }
    }
    Command::Delete { record_id, yes } => delete(&client, record_id, yes).await?,
    Command::Download { subject_id, out } => {
      let png = client.artifact(&subject_id).await?;
      let path = save(&out, &download_filename(&subject_id), &png)?;
      println!("saved {}", path.display());
    }
    Command::Reconcile => {
      let report = client.reconcile().await?;
      if report.is_consistent() {
        println!("stores are consistent");
      }
      for key in &report.orphaned_artifacts {
        println!("orphaned artifact  {key}");
      }
      for id in &report.missing_artifacts {
        println!("missing artifact   record {id}");
      }
    }
  }

  Ok(())
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn delete(client: &ApiClient, record_id: Uuid, yes: bool) -> Result<()> {
  let mut outcome = client.delete(record_id, yes).await?;
  if let DeleteOutcome::Cancelled { prompt } = &outcome {
    if !ask(prompt)? {
      println!("cancelled");
      return Ok(());
    }
    outcome = client.delete(record_id, true).await?;
  }

  match outcome {
    DeleteOutcome::Deleted { removed, roster, refresh_error } => {
      if removed {
        println!("deleted {record_id}; {} records remain", roster.len());
      } else {
        println!("record {record_id} was already gone");
      }
      if let Some(e) = refresh_error {
        eprintln!("warning: roster could not be refreshed: {e}");
      }
    }
    DeleteOutcome::Cancelled { .. } => println!("cancelled"),
  }
  Ok(())
}

/// Put the prompt on stdout and read a yes/no answer. Defaults to no.
fn ask(prompt: &DeletePrompt) -> Result<bool> {
  print!("{} [y/N] ", prompt.message);
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

// ─── Output helpers ───────────────────────────────────────────────────────────

fn roster_line(entry: &RosterEntry) -> String {
  let record = &entry.record;
  let artifact = match &entry.artifact {
    ArtifactStatus::Available { url } => url.clone(),
    ArtifactStatus::Missing => "(artifact missing)".to_string(),
    ArtifactStatus::Unavailable { reason } => format!("(artifact unavailable: {reason})"),
  };
  format!(
    "{:<12} {:<28} {}  {}",
    record.subject_id, record.subject_name, record.record_id, artifact
  )
}

fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
  let encoded = data_uri
    .strip_prefix("data:image/png;base64,")
    .ok_or_else(|| anyhow!("server returned an unexpected data URI"))?;
  B64.decode(encoded).context("decoding PNG data URI")
}

fn save(dir: &Path, filename: &str, png: &[u8]) -> Result<PathBuf> {
  std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
  let path = dir.join(filename);
  std::fs::write(&path, png).with_context(|| format!("writing {}", path.display()))?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  use rollcall_core::record::SubjectRecord;

  use super::*;

  fn record(subject_id: &str) -> SubjectRecord {
    serde_json::from_value(serde_json::json!({
      "record_id": Uuid::nil(),
      "subject_name": "Ada Lovelace",
      "subject_id": subject_id,
      "artifact_key": format!("qrcodes/{subject_id}.png"),
      "created_at": "2024-01-01T00:00:00Z",
    }))
    .unwrap()
  }

  #[test]
  fn decodes_png_data_uri() {
    let png = decode_data_uri("data:image/png;base64,iVBORw==").unwrap();
    assert_eq!(png, b"\x89PNG");
  }

  #[test]
  fn rejects_other_data_uris() {
    assert!(decode_data_uri("data:text/plain;base64,aGk=").is_err());
  }

  #[test]
  fn save_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("tokens");
    let path = save(&out, "student_S1_qrcode.png", b"png").unwrap();
    assert_eq!(path, out.join("student_S1_qrcode.png"));
    assert_eq!(std::fs::read(path).unwrap(), b"png");
  }

  #[test]
  fn roster_line_flags_missing_artifacts() {
    let entry = RosterEntry {
      record:   record("S100"),
      artifact: ArtifactStatus::Missing,
    };
    let line = roster_line(&entry);
    assert!(line.starts_with("S100"));
    assert!(line.contains("Ada Lovelace"));
    assert!(line.ends_with("(artifact missing)"));
  }
}
