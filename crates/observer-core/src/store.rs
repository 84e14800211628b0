//! The `EventStore` trait.
//!
//! The trait is implemented by storage backends (`observer-store-sqlite`,
//! `observer-store-document`). The request layer depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use crate::record::{Scope, TransitionRecord};

/// Abstraction over an append-only transition log.
///
/// Records are never updated or deleted. Implementations must call
/// [`TransitionRecord::validate`] before writing and must preserve submission
/// order for records of the same scope.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist one record. Either the whole record is written or nothing is.
  fn append(
    &self,
    record: TransitionRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist every record of one boundary event as a single logical write.
  ///
  /// Both shipped backends are atomic: if any record is rejected, none is
  /// stored. An empty batch is a no-op.
  fn append_batch(
    &self,
    records: Vec<TransitionRecord>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All records for `scope`, ascending by timestamp. Records sharing a
  /// timestamp come back in insertion order.
  fn query_ordered(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<TransitionRecord>, Self::Error>> + Send + '_;
}
