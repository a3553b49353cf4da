//! Handlers for the roster view.

use axum::{Json, extract::State};
use rollcall_core::{
  roster::{Reconciliation, RosterEntry},
  store::{ArtifactStore, RecordStore},
};

use crate::{AppState, auth::Operator, error::ApiError};

/// `GET /api/roster`: records ordered by subject id, each with its artifact
/// status.
pub async fn list<R, A>(
  State(state): State<AppState<R, A>>,
  Operator(session): Operator,
) -> Result<Json<Vec<RosterEntry>>, ApiError>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  Ok(Json(state.roster.refresh(&session).await?))
}

/// `GET /api/reconcile`
pub async fn reconcile<R, A>(
  State(state): State<AppState<R, A>>,
  Operator(session): Operator,
) -> Result<Json<Reconciliation>, ApiError>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  Ok(Json(state.roster.reconcile(&session).await?))
}
