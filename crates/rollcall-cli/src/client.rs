//! Async HTTP client wrapping the Rollcall JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Response, StatusCode, Url};
use rollcall_core::{
  roster::{Reconciliation, RosterEntry},
  token::artifact_key,
};
use rollcall_service::{DeleteOutcome, DeletePrompt, IssueRequest, Issued};
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the Rollcall API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the Rollcall JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

/// Body of every non-2xx response.
#[derive(Deserialize)]
struct ErrorBody {
  error:     String,
  #[serde(default)]
  retryable: bool,
  prompt:    Option<DeletePrompt>,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── Records ───────────────────────────────────────────────────────────────

  /// `POST /api/records`
  pub async fn issue(&self, subject_name: &str, subject_id: &str) -> Result<Issued> {
    let body = IssueRequest {
      subject_name: subject_name.to_string(),
      subject_id:   subject_id.to_string(),
    };
    let resp = self
      .auth(self.client.post(self.url("/records")))
      .json(&body)
      .send()
      .await
      .context("POST /records failed")?;

    let resp = check(resp, "POST /records").await?;
    resp.json().await.context("deserialising issued token")
  }

  /// `DELETE /api/records/{id}[?confirm=true]`
  ///
  /// An unconfirmed delete comes back as [`DeleteOutcome::Cancelled`] with
  /// the question the operator has to answer.
  pub async fn delete(&self, record_id: Uuid, confirm: bool) -> Result<DeleteOutcome> {
    let mut req = self.auth(self.client.delete(self.url(&format!("/records/{record_id}"))));
    if confirm {
      req = req.query(&[("confirm", "true")]);
    }
    let resp = req.send().await.context("DELETE /records failed")?;

    if resp.status() == StatusCode::PRECONDITION_REQUIRED {
      let body: ErrorBody = resp.json().await.context("deserialising delete prompt")?;
      let prompt = body
        .prompt
        .ok_or_else(|| anyhow!("server asked for confirmation without a prompt"))?;
      return Ok(DeleteOutcome::Cancelled { prompt });
    }
    let resp = check(resp, "DELETE /records").await?;
    resp.json().await.context("deserialising delete outcome")
  }

  // ── Roster ────────────────────────────────────────────────────────────────

  /// `GET /api/roster`
  pub async fn roster(&self) -> Result<Vec<RosterEntry>> {
    let resp = self
      .auth(self.client.get(self.url("/roster")))
      .send()
      .await
      .context("GET /roster failed")?;

    let resp = check(resp, "GET /roster").await?;
    resp.json().await.context("deserialising roster")
  }

  /// `GET /api/reconcile`
  pub async fn reconcile(&self) -> Result<Reconciliation> {
    let resp = self
      .auth(self.client.get(self.url("/reconcile")))
      .send()
      .await
      .context("GET /reconcile failed")?;

    let resp = check(resp, "GET /reconcile").await?;
    resp.json().await.context("deserialising reconciliation")
  }

  // ── Artifacts ─────────────────────────────────────────────────────────────

  /// `GET /artifacts/qrcodes/<subject_id>.png`
  pub async fn artifact(&self, subject_id: &str) -> Result<Vec<u8>> {
    let url = artifact_url(&self.config.base_url, &artifact_key(subject_id))?;
    let resp = self
      .auth(self.client.get(url))
      .send()
      .await
      .context("GET /artifacts failed")?;

    if resp.status() == StatusCode::NOT_FOUND {
      bail!("no token stored for subject {subject_id}");
    }
    let resp = check(resp, "GET /artifacts").await?;
    let bytes = resp.bytes().await.context("reading artifact")?;
    Ok(bytes.to_vec())
  }
}

/// `<base>/artifacts/<key>`, with each key segment percent-encoded.
fn artifact_url(base_url: &str, key: &str) -> Result<Url> {
  let mut url = Url::parse(base_url).with_context(|| format!("invalid URL {base_url}"))?;
  url
    .path_segments_mut()
    .map_err(|()| anyhow!("{base_url} cannot be a base URL"))?
    .pop_if_empty()
    .push("artifacts")
    .extend(key.split('/'));
  Ok(url)
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) if body.retryable => {
      Err(anyhow!("{what} → {status}: {} (safe to retry)", body.error))
    }
    Ok(body) => Err(anyhow!("{what} → {status}: {}", body.error)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn artifact_url_escapes_subject_id() {
    let url = artifact_url("http://localhost:8080", &artifact_key("S 1")).unwrap();
    assert_eq!(url.as_str(), "http://localhost:8080/artifacts/qrcodes/S%201.png");
  }

  #[test]
  fn artifact_url_keeps_base_path() {
    let url = artifact_url("https://example.org/school/", "qrcodes/S1.png").unwrap();
    assert_eq!(url.as_str(), "https://example.org/school/artifacts/qrcodes/S1.png");
  }
}
