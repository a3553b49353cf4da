//! In-process [`SessionGate`] implementation.

use std::sync::{PoisonError, RwLock};

use rollcall_core::session::{Principal, SessionGate};

/// A session holding at most one signed-in operator.
///
/// The API layer builds one per request from verified credentials; the CLI
/// and tests build them directly.
#[derive(Debug, Default)]
pub struct OperatorSession {
  principal: RwLock<Option<Principal>>,
}

impl OperatorSession {
  /// A session with `name` signed in.
  pub fn signed_in(name: impl Into<String>) -> Self {
    Self {
      principal: RwLock::new(Some(Principal { name: name.into() })),
    }
  }

  /// A session with nobody signed in.
  pub fn anonymous() -> Self { Self::default() }
}

impl SessionGate for OperatorSession {
  fn current_identity(&self) -> Option<Principal> {
    self
      .principal
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  fn sign_out(&self) {
    let mut principal = self
      .principal
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    if let Some(p) = principal.take() {
      tracing::info!(operator = %p.name, "signed out");
    }
  }
}
