//! The session gate: an injected capability saying who, if anyone, is
//! operating the system.
//!
//! The core never reads authentication state from ambient globals. Every
//! workflow call receives a [`SessionGate`] and treats the absence of a
//! principal as "not authorized".

use serde::{Deserialize, Serialize};

/// An authenticated operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
  /// Login name, e.g. an email address.
  pub name: String,
}

pub trait SessionGate: Send + Sync {
  /// The operator currently signed in, if any.
  fn current_identity(&self) -> Option<Principal>;

  /// End the session. Subsequent calls to
  /// [`current_identity`](Self::current_identity) return `None`.
  fn sign_out(&self);
}
