//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use rollcall_service::{DeletePrompt, IssueError, RosterError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  /// The delete was not confirmed; carries the question to put to the
  /// operator.
  #[error("{}", .0.message)]
  ConfirmationRequired(DeletePrompt),

  #[error(transparent)]
  Issue(#[from] IssueError),

  #[error(transparent)]
  Roster(#[from] RosterError),

  #[error("artifact store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let message = self.to_string();
    let (status, body) = match self {
      ApiError::Unauthorized
      | ApiError::Issue(IssueError::Unauthorized)
      | ApiError::Roster(RosterError::Unauthorized) => {
        let mut res =
          (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"rollcall\""),
        );
        return res;
      }
      ApiError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "error": message })),
      ApiError::ConfirmationRequired(prompt) => (
        StatusCode::PRECONDITION_REQUIRED,
        json!({ "error": message, "prompt": prompt }),
      ),
      ApiError::Issue(IssueError::Validation(_)) => {
        (StatusCode::BAD_REQUEST, json!({ "error": message }))
      }
      ApiError::Issue(IssueError::Encoding(_)) => {
        (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": message }))
      }
      ApiError::Issue(IssueError::StoreWrite { stage, orphaned_artifact, .. }) => {
        if let Some(key) = &orphaned_artifact {
          tracing::warn!(%key, "issuance left an orphaned artifact");
        }
        (
          StatusCode::SERVICE_UNAVAILABLE,
          json!({
            "error": message,
            "retryable": true,
            "stage": stage.to_string(),
            "orphaned_artifact": orphaned_artifact,
          }),
        )
      }
      ApiError::Roster(RosterError::StoreWrite(_)) => (
        StatusCode::SERVICE_UNAVAILABLE,
        json!({ "error": message, "retryable": true }),
      ),
      ApiError::Roster(RosterError::StoreRead(_)) | ApiError::Store(_) => {
        (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": message }))
      }
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use rollcall_service::WriteStage;

  use super::*;

  async fn body_json(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn io_error() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "store down")
  }

  #[tokio::test]
  async fn record_write_failure_is_retryable() {
    let err = ApiError::from(IssueError::StoreWrite {
      stage:             WriteStage::Record,
      orphaned_artifact: Some("qrcodes/S1.png".into()),
      source:            Box::new(io_error()),
    });
    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(res).await;
    assert_eq!(body["retryable"], true);
    assert_eq!(body["stage"], "record");
    assert_eq!(body["orphaned_artifact"], "qrcodes/S1.png");
  }

  #[tokio::test]
  async fn store_read_failure_is_unavailable() {
    let err = ApiError::from(RosterError::StoreRead(Arc::new(io_error())));
    let res = err.into_response();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(body_json(res).await["error"].as_str().unwrap().contains("store down"));
  }

  #[tokio::test]
  async fn signed_out_session_is_a_challenge() {
    let res = ApiError::from(RosterError::Unauthorized).into_response();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(res.headers().contains_key(header::WWW_AUTHENTICATE));
  }
}
