//! `GET /artifacts/{*key}`: serves stored PNG bytes.

use axum::{
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};
use rollcall_core::store::{ArtifactStore, RecordStore};

use crate::{AppState, auth::Operator, error::ApiError};

/// Any `?v=` query on the URL is ignored; it only exists to bust caches.
pub async fn get_one<R, A>(
  State(state): State<AppState<R, A>>,
  Operator(_): Operator,
  Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  let png = state
    .artifacts
    .fetch(&key)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("artifact {key} not found")))?;
  Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
