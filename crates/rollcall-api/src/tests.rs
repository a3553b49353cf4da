//! Router tests over the SQLite record store and a temp-dir artifact store.

use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rand_core::OsRng;
use rollcall_artifact_fs::FsArtifactStore;
use rollcall_store_sqlite::SqliteStore;
use rollcall_token::TokenEncoder;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use crate::{AppState, auth::AuthConfig, router};

const BASE_URL: &str = "http://localhost:8080";

struct TestApp {
  state: AppState<SqliteStore, FsArtifactStore>,
  auth:  String,
  _dir:  TempDir,
}

async fn make_app() -> TestApp {
  let dir = tempfile::tempdir().unwrap();
  let records = SqliteStore::open_in_memory().await.unwrap();
  let artifacts = FsArtifactStore::open(dir.path().join("artifacts"), BASE_URL)
    .await
    .unwrap();

  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default()
    .hash_password(b"secret", &salt)
    .unwrap()
    .to_string();

  TestApp {
    state: AppState::new(
      Arc::new(records),
      Arc::new(artifacts),
      TokenEncoder::default(),
      AuthConfig { username: "ops".to_string(), password_hash: hash },
    ),
    auth:  format!("Basic {}", B64.encode("ops:secret")),
    _dir:  dir,
  }
}

impl TestApp {
  async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder()
      .method(method)
      .uri(uri)
      .header(header::AUTHORIZATION, &self.auth);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    router(self.state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap()
  }

  async fn issue(&self, name: &str, id: &str) -> Value {
    let resp = self
      .send(
        "POST",
        "/api/records",
        Some(json!({ "subject_name": name, "subject_id": id })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }
}

async fn body_bytes(resp: Response) -> Vec<u8> {
  axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap()
    .to_vec()
}

async fn body_json(resp: Response) -> Value {
  serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

// ── Auth ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credentials_are_challenged() {
  let app = make_app().await;
  let req = Request::builder()
    .uri("/api/roster")
    .body(Body::empty())
    .unwrap();
  let resp = router(app.state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn wrong_password_is_rejected() {
  let app = make_app().await;
  let req = Request::builder()
    .method("POST")
    .uri("/api/records")
    .header(header::AUTHORIZATION, format!("Basic {}", B64.encode("ops:nope")))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(r#"{"subject_name":"Ada","subject_id":"S1"}"#))
    .unwrap();
  let resp = router(app.state.clone()).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let roster = body_json(app.send("GET", "/api/roster", None).await).await;
  assert_eq!(roster, json!([]));
}

// ── Issue ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn issue_returns_record_and_download() {
  let app = make_app().await;
  let issued = app.issue("Ada Lovelace", "S100").await;

  assert_eq!(issued["record"]["subject_name"], "Ada Lovelace");
  assert_eq!(issued["record"]["subject_id"], "S100");
  assert_eq!(issued["record"]["artifact_key"], "qrcodes/S100.png");
  assert_eq!(issued["canonical"], r#"{"name":"Ada Lovelace","id":"S100"}"#);
  assert_eq!(issued["artifact"]["filename"], "student_S100_qrcode.png");

  let data_uri = issued["artifact"]["data_uri"].as_str().unwrap();
  let png = B64
    .decode(data_uri.strip_prefix("data:image/png;base64,").unwrap())
    .unwrap();
  assert!(png.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn empty_field_is_bad_request() {
  let app = make_app().await;
  let resp = app
    .send(
      "POST",
      "/api/records",
      Some(json!({ "subject_name": "", "subject_id": "S1" })),
    )
    .await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  assert!(body_json(resp).await["error"].is_string());

  let report = body_json(app.send("GET", "/api/reconcile", None).await).await;
  assert_eq!(report["orphaned_artifacts"], json!([]));
}

#[tokio::test]
async fn path_like_subject_id_is_bad_request() {
  let app = make_app().await;
  for id in ["/S1", "../S1", "a\\b"] {
    let resp = app
      .send(
        "POST",
        "/api/records",
        Some(json!({ "subject_name": "Ada", "subject_id": id })),
      )
      .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{id:?}");
    assert!(body_json(resp).await.get("retryable").is_none());
  }

  let report = body_json(app.send("GET", "/api/reconcile", None).await).await;
  assert_eq!(report["orphaned_artifacts"], json!([]));
}

#[tokio::test]
async fn issued_record_appears_in_next_roster() {
  let app = make_app().await;
  assert_eq!(body_json(app.send("GET", "/api/roster", None).await).await, json!([]));
  app.issue("Ada", "S100").await;

  let roster = body_json(app.send("GET", "/api/roster", None).await).await;
  assert_eq!(roster.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn oversized_payload_is_unprocessable() {
  let app = make_app().await;
  let resp = app
    .send(
      "POST",
      "/api/records",
      Some(json!({ "subject_name": "x".repeat(5000), "subject_id": "S1" })),
    )
    .await;
  assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ── Roster & artifacts ────────────────────────────────────────────────────────

#[tokio::test]
async fn roster_is_ordered_and_links_resolve() {
  let app = make_app().await;
  app.issue("Grace Hopper", "S200").await;
  app.issue("Ada Lovelace", "S100").await;

  let roster = body_json(app.send("GET", "/api/roster", None).await).await;
  let entries = roster.as_array().unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0]["record"]["subject_id"], "S100");
  assert_eq!(entries[1]["record"]["subject_id"], "S200");
  assert_eq!(entries[0]["artifact"]["status"], "available");

  let url = entries[0]["artifact"]["url"].as_str().unwrap();
  let path = url.strip_prefix(BASE_URL).unwrap();
  assert!(path.starts_with("/artifacts/qrcodes/S100.png?v="), "{path}");

  let resp = app.send("GET", path, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
  assert!(body_bytes(resp).await.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn unknown_artifact_is_not_found() {
  let app = make_app().await;
  let resp = app.send("GET", "/artifacts/qrcodes/nobody.png", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ── Delete ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_requires_confirmation() {
  let app = make_app().await;
  let issued = app.issue("Ada", "S100").await;
  let id = issued["record"]["record_id"].as_str().unwrap().to_string();

  let resp = app.send("DELETE", &format!("/api/records/{id}"), None).await;
  assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
  let body = body_json(resp).await;
  assert_eq!(body["error"], "Are you sure you want to delete student S100?");
  assert_eq!(body["prompt"]["subject_id"], "S100");

  let roster = body_json(app.send("GET", "/api/roster", None).await).await;
  assert_eq!(roster.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn confirmed_delete_twice() {
  let app = make_app().await;
  let issued = app.issue("Ada", "S100").await;
  let id = issued["record"]["record_id"].as_str().unwrap().to_string();
  let uri = format!("/api/records/{id}?confirm=true");

  let first = body_json(app.send("DELETE", &uri, None).await).await;
  assert_eq!(first["outcome"], "deleted");
  assert_eq!(first["removed"], true);
  assert_eq!(first["roster"], json!([]));

  let resp = app.send("DELETE", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["removed"], false);
}

#[tokio::test]
async fn deleted_record_leaves_orphan_for_reconcile() {
  let app = make_app().await;
  let issued = app.issue("Ada", "S100").await;
  let id = issued["record"]["record_id"].as_str().unwrap().to_string();
  app
    .send("DELETE", &format!("/api/records/{id}?confirm=true"), None)
    .await;

  let report = body_json(app.send("GET", "/api/reconcile", None).await).await;
  assert_eq!(report["orphaned_artifacts"], json!(["qrcodes/S100.png"]));
  assert_eq!(report["missing_artifacts"], json!([]));
}
