//! The `RecordStore` trait and its outcome types.
//!
//! The trait is implemented by storage backends (e.g. `rwhois-store-fs`).
//! Higher layers (`rwhois-api`, `rwhois-cli`) depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use serde::Serialize;

use crate::record::{Collection, Handle, NewRecord, Record, RecordKey};

/// Coarse classification of a store failure, so callers can pick an exit or
/// status code without knowing the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  /// The addressed record does not exist.
  NotFound,
  /// The request was rejected before touching storage (bad handle, bad
  /// value, read-only field).
  Invalid,
  /// Storage itself failed.
  Storage,
}

pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn failure_kind(&self) -> FailureKind;
}

/// Result of a single-field update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
  /// `false` when the record has no line for the requested field. The record
  /// is left as it was, apart from a network's `updated` stamp.
  pub applied: bool,
}

/// Abstraction over an RWHOIS record store backend.
///
/// Handles are immutable: a rename is a delete followed by an add. References
/// between records are never checked, so deletes do not cascade.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  /// Write `record` under its key, replacing any existing file completely.
  fn add(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<RecordKey, Self::Error>> + Send + '_;

  /// Replace the first `field:` line of an existing record with
  /// `field: value`.
  ///
  /// Fails if the record does not exist or `field` is read-only. A field
  /// with no matching line is a successful no-op, reported through
  /// [`UpdateOutcome::applied`]. Network resources also get their `updated`
  /// date refreshed.
  fn update<'a>(
    &'a self,
    key: &'a RecordKey,
    field: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<UpdateOutcome, Self::Error>> + Send + 'a;

  /// Remove a record. Fails if it does not exist.
  fn delete<'a>(
    &'a self,
    key: &'a RecordKey,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Read a record back. Returns `None` if it does not exist.
  fn get<'a>(
    &'a self,
    key: &'a RecordKey,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Handles stored in one collection directory, sorted.
  fn list(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Vec<Handle>, Self::Error>> + Send + '_;
}
