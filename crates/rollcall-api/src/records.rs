//! Handlers for `/api/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/api/records` | 201 with the issued record and a downloadable PNG |
//! | `DELETE` | `/api/records/{id}` | Requires `?confirm=true`, 428 otherwise |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use rollcall_core::store::{ArtifactStore, RecordStore};
use rollcall_service::{DeleteOutcome, DeletePrompt, IssueRequest};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Operator, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/records`: body: `{"subject_name":"Ada","subject_id":"S100"}`
pub async fn create<R, A>(
  State(state): State<AppState<R, A>>,
  Operator(session): Operator,
  Json(body): Json<IssueRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  let issued = state.workflow.issue(&session, body).await?;
  state.roster.invalidate().await;
  Ok((StatusCode::CREATED, Json(issued)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
  /// The operator's answer to the [`DeletePrompt`].
  #[serde(default)]
  pub confirm: bool,
}

/// `DELETE /api/records/{id}?confirm=true`
///
/// Without confirmation the record is left alone and the prompt comes back
/// with status 428, so a client can ask and resend.
pub async fn delete_one<R, A>(
  State(state): State<AppState<R, A>>,
  Operator(session): Operator,
  Path(id): Path<Uuid>,
  Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteOutcome>, ApiError>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  let confirm = |_: &DeletePrompt| params.confirm;
  match state.roster.delete(&session, id, &confirm).await? {
    DeleteOutcome::Cancelled { prompt } => Err(ApiError::ConfirmationRequired(prompt)),
    outcome => Ok(Json(outcome)),
  }
}
