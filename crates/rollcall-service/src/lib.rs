//! Issuance and roster workflows for Rollcall.
//!
//! Orchestrates the token encoder and the two stores behind an injected
//! [`SessionGate`](rollcall_core::session::SessionGate). Generic over any
//! [`RecordStore`](rollcall_core::store::RecordStore) and
//! [`ArtifactStore`](rollcall_core::store::ArtifactStore); HTTP and
//! persistence live in other crates.

pub mod download;
pub mod error;
pub mod issue;
pub mod roster;
pub mod session;

pub use error::{IssueError, RosterError, WriteStage};
pub use issue::{IssuanceWorkflow, IssueRequest, Issued};
pub use roster::{Confirm, DeleteOutcome, DeletePrompt, RosterController};
pub use session::OperatorSession;
