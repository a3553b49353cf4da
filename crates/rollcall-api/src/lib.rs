//! JSON API for Rollcall.
//!
//! Exposes an axum [`Router`] over the issuance and roster workflows, backed
//! by any [`RecordStore`] and [`ArtifactStore`]. Every route requires HTTP
//! Basic credentials; TLS is the caller's responsibility.
//!
//! | Method   | Path                            | Notes |
//! |----------|---------------------------------|-------|
//! | `POST`   | `/api/records`                  | Body: `{"subject_name":"…","subject_id":"…"}` |
//! | `GET`    | `/api/roster`                   | Refreshes and returns the roster |
//! | `DELETE` | `/api/records/{id}?confirm=true`| 428 without `confirm=true` |
//! | `GET`    | `/api/reconcile`                | Orphaned / missing artifacts |
//! | `GET`    | `/artifacts/{*key}`             | Raw PNG bytes |

pub mod artifacts;
pub mod auth;
pub mod error;
pub mod records;
pub mod roster;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use rollcall_core::store::{ArtifactStore, RecordStore};
use rollcall_service::{IssuanceWorkflow, RosterController};
use rollcall_token::TokenEncoder;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<R, A> {
  pub workflow:  Arc<IssuanceWorkflow<R, A>>,
  /// One controller per server so concurrent `GET /api/roster` calls share a
  /// refresh.
  pub roster:    Arc<RosterController<R, A>>,
  pub artifacts: Arc<A>,
  pub auth:      Arc<AuthConfig>,
}

impl<R, A> Clone for AppState<R, A> {
  fn clone(&self) -> Self {
    Self {
      workflow:  self.workflow.clone(),
      roster:    self.roster.clone(),
      artifacts: self.artifacts.clone(),
      auth:      self.auth.clone(),
    }
  }
}

impl<R, A> AppState<R, A>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  pub fn new(
    records: Arc<R>,
    artifacts: Arc<A>,
    encoder: TokenEncoder,
    auth: AuthConfig,
  ) -> Self {
    Self {
      workflow: Arc::new(IssuanceWorkflow::new(
        records.clone(),
        artifacts.clone(),
        encoder,
      )),
      roster: Arc::new(RosterController::new(records, artifacts.clone())),
      artifacts,
      auth: Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<R, A>(state: AppState<R, A>) -> Router
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  Router::new()
    // Records
    .route("/api/records", post(records::create::<R, A>))
    .route("/api/records/{id}", delete(records::delete_one::<R, A>))
    // Roster
    .route("/api/roster", get(roster::list::<R, A>))
    .route("/api/reconcile", get(roster::reconcile::<R, A>))
    // Artifact bytes, the target of resolved artifact URLs
    .route("/artifacts/{*key}", get(artifacts::get_one::<R, A>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

#[cfg(test)]
mod tests;
