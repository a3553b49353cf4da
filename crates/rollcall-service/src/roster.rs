//! The roster view: records joined with their resolved artifacts.
//!
//! A refresh lists every record, then resolves all artifact keys
//! concurrently. A failed resolution degrades only its own entry. Concurrent
//! refreshes share one in-flight load so callers never observe interleaved
//! partial results. Loads run on their own task and publish their own result,
//! and a write makes every later refresh start a fresh load.

use std::{collections::BTreeSet, future::Future, sync::Arc};

use futures::future::{BoxFuture, FutureExt as _, Shared, join_all};
use rollcall_core::{
  record::{RecordId, SubjectRecord},
  roster::{ArtifactStatus, Reconciliation, RosterEntry},
  session::{Principal, SessionGate},
  store::{ArtifactStore, RecordStore, Resolution},
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::RosterError;

type RefreshResult = Result<Vec<RosterEntry>, RosterError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

// ─── Deletion guard ──────────────────────────────────────────────────────────

/// What the operator is asked before a record is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePrompt {
  pub record_id:  RecordId,
  /// `None` when the record no longer exists.
  pub subject_id: Option<String>,
  pub message:    String,
}

impl DeletePrompt {
  fn new(record_id: RecordId, record: Option<&SubjectRecord>) -> Self {
    let subject_id = record.map(|r| r.subject_id.clone());
    let message = match &subject_id {
      Some(id) => format!("Are you sure you want to delete student {id}?"),
      None => format!("Are you sure you want to delete record {record_id}?"),
    };
    Self { record_id, subject_id, message }
  }
}

/// Irreversible-action guard consulted by [`RosterController::delete`].
pub trait Confirm: Send + Sync {
  fn confirm(&self, prompt: &DeletePrompt) -> bool;
}

impl<F> Confirm for F
where
  F: Fn(&DeletePrompt) -> bool + Send + Sync,
{
  fn confirm(&self, prompt: &DeletePrompt) -> bool { self(prompt) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeleteOutcome {
  /// The operator declined; nothing was deleted.
  Cancelled { prompt: DeletePrompt },
  /// The store accepted the delete. `removed` is `false` if the record was
  /// already gone.
  Deleted {
    removed:       bool,
    /// The refreshed roster, or the last snapshot minus the deleted record
    /// when `refresh_error` is set.
    roster:        Vec<RosterEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_error: Option<String>,
  },
}

// ─── Controller ──────────────────────────────────────────────────────────────

/// A load currently running on its own task.
struct Inflight {
  generation: u64,
  /// Write epoch the load started in.
  epoch:      u64,
  load:       SharedRefresh,
}

#[derive(Default)]
struct State {
  /// Entries from the last successful refresh.
  snapshot:   Vec<RosterEntry>,
  inflight:   Option<Inflight>,
  generation: u64,
  /// Bumped by every write; loads from an older epoch are never joined.
  epoch:      u64,
}

pub struct RosterController<R, A> {
  records:   Arc<R>,
  artifacts: Arc<A>,
  /// Guards bookkeeping only; never held across store I/O.
  state:     Arc<Mutex<State>>,
}

impl<R, A> RosterController<R, A>
where
  R: RecordStore + 'static,
  A: ArtifactStore + 'static,
{
  pub fn new(records: Arc<R>, artifacts: Arc<A>) -> Self {
    Self { records, artifacts, state: Arc::new(Mutex::new(State::default())) }
  }

  /// Entries from the most recent successful refresh.
  pub async fn snapshot(&self) -> Vec<RosterEntry> {
    self.state.lock().await.snapshot.clone()
  }

  /// Record that the stores changed. A refresh after this call never joins
  /// a load that started before it.
  pub async fn invalidate(&self) { self.state.lock().await.epoch += 1; }

  /// Rebuild the roster, ordered by subject id.
  ///
  /// Joins an in-flight refresh if one started since the last write. A
  /// listing failure is returned as [`RosterError::StoreRead`] and leaves the
  /// snapshot as it was.
  pub async fn refresh(&self, session: &impl SessionGate) -> RefreshResult {
    authorize(session)?;

    let load = {
      let mut state = self.state.lock().await;
      let epoch = state.epoch;
      let current = state
        .inflight
        .as_ref()
        .filter(|inflight| inflight.epoch == epoch)
        .map(|inflight| inflight.load.clone());
      match current {
        Some(load) => load,
        None => self.start_load(&mut state),
      }
    };

    load.await
  }

  /// Spawn a load that publishes its own result, so dropping every caller
  /// cannot leave a stale entry in the in-flight slot.
  fn start_load(&self, state: &mut State) -> SharedRefresh {
    state.generation += 1;
    let generation = state.generation;

    let task = tokio::spawn(publish(
      self.state.clone(),
      generation,
      load_roster(self.records.clone(), self.artifacts.clone()),
    ));
    let load = async move {
      task
        .await
        .unwrap_or_else(|e| Err(RosterError::StoreRead(Arc::new(e))))
    }
    .boxed()
    .shared();

    state.inflight = Some(Inflight {
      generation,
      epoch: state.epoch,
      load: load.clone(),
    });
    load
  }

  /// Delete a record after `confirm` approves the [`DeletePrompt`], then
  /// refresh.
  ///
  /// A failed delete is returned without touching the snapshot. Deleting an
  /// id that no longer exists succeeds with `removed: false`. Once the store
  /// has accepted the delete the outcome is always
  /// [`DeleteOutcome::Deleted`]; a failed follow-up refresh is reported in
  /// `refresh_error`.
  pub async fn delete(
    &self,
    session: &impl SessionGate,
    record_id: RecordId,
    confirm: &impl Confirm,
  ) -> Result<DeleteOutcome, RosterError> {
    let operator = authorize(session)?;

    let record = self
      .records
      .get(record_id)
      .await
      .map_err(|e| RosterError::StoreRead(Arc::new(e)))?;

    let prompt = DeletePrompt::new(record_id, record.as_ref());
    if !confirm.confirm(&prompt) {
      tracing::debug!(%record_id, "delete cancelled");
      return Ok(DeleteOutcome::Cancelled { prompt });
    }

    let removed = self
      .records
      .delete(record_id)
      .await
      .map_err(|e| RosterError::StoreWrite(Arc::new(e)))?;
    self.invalidate().await;

    tracing::info!(
      operator = %operator.name,
      %record_id,
      subject_id = prompt.subject_id.as_deref().unwrap_or("-"),
      removed,
      "record deleted"
    );

    match self.refresh(session).await {
      Ok(roster) => Ok(DeleteOutcome::Deleted { removed, roster, refresh_error: None }),
      Err(e) => {
        tracing::warn!(%record_id, error = %e, "refresh after delete failed");
        let mut roster = self.snapshot().await;
        roster.retain(|entry| entry.record.record_id != record_id);
        Ok(DeleteOutcome::Deleted {
          removed,
          roster,
          refresh_error: Some(e.to_string()),
        })
      }
    }
  }

  /// Compare both stores. Reports inconsistencies without fixing them.
  pub async fn reconcile(
    &self,
    session: &impl SessionGate,
  ) -> Result<Reconciliation, RosterError> {
    authorize(session)?;

    let records = self
      .records
      .list()
      .await
      .map_err(|e| RosterError::StoreRead(Arc::new(e)))?;
    let keys = self
      .artifacts
      .keys()
      .await
      .map_err(|e| RosterError::StoreRead(Arc::new(e)))?;

    let stored: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
    let referenced: BTreeSet<&str> =
      records.iter().map(|r| r.artifact_key.as_str()).collect();

    let report = Reconciliation {
      orphaned_artifacts: keys
        .iter()
        .filter(|k| !referenced.contains(k.as_str()))
        .cloned()
        .collect(),
      missing_artifacts:  records
        .iter()
        .filter(|r| !stored.contains(r.artifact_key.as_str()))
        .map(|r| r.record_id)
        .collect(),
    };

    if !report.is_consistent() {
      tracing::warn!(
        orphaned = report.orphaned_artifacts.len(),
        missing = report.missing_artifacts.len(),
        "stores are out of sync"
      );
    }
    Ok(report)
  }
}

/// Await `load`, then publish its result if it is still the current load.
async fn publish(
  state: Arc<Mutex<State>>,
  generation: u64,
  load: impl Future<Output = RefreshResult>,
) -> RefreshResult {
  let result = load.await;
  let mut state = state.lock().await;
  if state.inflight.as_ref().is_some_and(|i| i.generation == generation) {
    state.inflight = None;
    if let Ok(entries) = &result {
      state.snapshot = entries.clone();
    }
  }
  result
}

fn authorize(session: &impl SessionGate) -> Result<Principal, RosterError> {
  session.current_identity().ok_or(RosterError::Unauthorized)
}

async fn load_roster<R, A>(records: Arc<R>, artifacts: Arc<A>) -> RefreshResult
where
  R: RecordStore,
  A: ArtifactStore,
{
  let listed = records
    .list()
    .await
    .map_err(|e| RosterError::StoreRead(Arc::new(e)))?;

  // join_all yields results in input order, whatever order they finish in.
  let resolved =
    join_all(listed.iter().map(|r| artifacts.resolve(&r.artifact_key))).await;

  Ok(
    listed
      .into_iter()
      .zip(resolved)
      .map(|(record, resolution)| {
        let artifact = match resolution {
          Ok(Resolution::Found(url)) => ArtifactStatus::Available { url },
          Ok(Resolution::NotFound) => {
            tracing::warn!(
              record_id = %record.record_id,
              key = %record.artifact_key,
              "artifact missing"
            );
            ArtifactStatus::Missing
          }
          Err(e) => {
            tracing::warn!(
              record_id = %record.record_id,
              key = %record.artifact_key,
              error = %e,
              "artifact resolution failed"
            );
            ArtifactStatus::Unavailable { reason: e.to_string() }
          }
        };
        RosterEntry { record, artifact }
      })
      .collect(),
  )
}
