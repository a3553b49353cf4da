//! The `RecordStore` and `ArtifactStore` traits.
//!
//! Records and artifacts live in two independently-failing stores. Neither
//! trait offers transactions spanning both; the issuance workflow in
//! `rollcall-service` sequences the writes and documents the gap.

use std::future::Future;

use crate::record::{NewRecord, RecordId, SubjectRecord};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Abstraction over the structured metadata store.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new record. `record_id` and `created_at` are assigned by the
  /// store. No uniqueness check is made on `subject_id`.
  fn create(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<SubjectRecord, Self::Error>> + Send + '_;

  /// Retrieve a record by id. Returns `None` if not found.
  fn get(
    &self,
    record_id: RecordId,
  ) -> impl Future<Output = Result<Option<SubjectRecord>, Self::Error>> + Send + '_;

  /// All records, ordered by `subject_id` ascending.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<SubjectRecord>, Self::Error>> + Send + '_;

  /// Delete a record. Idempotent: returns `false` if nothing was removed.
  fn delete(
    &self,
    record_id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Artifacts ───────────────────────────────────────────────────────────────

/// Outcome of [`ArtifactStore::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  /// A URL the artifact can be fetched from.
  Found(String),
  /// Nothing is stored under the key.
  NotFound,
}

/// Abstraction over the binary blob store holding rendered tokens.
///
/// There is no delete: deleting a record leaves its artifact in
/// place.
pub trait ArtifactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Store `blob` under `key`, overwriting any existing artifact.
  fn put<'a>(
    &'a self,
    key: &'a str,
    blob: Vec<u8>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Resolve `key` to a fetchable URL. A missing key is
  /// [`Resolution::NotFound`], never an error.
  fn resolve<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Resolution, Self::Error>> + Send + 'a;

  /// Read the raw bytes stored under `key`, if any.
  fn fetch<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Vec<u8>>, Self::Error>> + Send + 'a;

  /// Every key currently stored. Used by the reconciliation sweep.
  fn keys(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;
}
