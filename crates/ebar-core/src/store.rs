//! The `EventStore` trait.
//!
//! Implemented by storage backends (`ebar-store-csv`, `ebar-store-sqlite`).
//! The engine depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  event::{Event, EventMeta},
  unit::UnitId,
};

/// Append-only record of scheduled events.
///
/// Rows are never updated or deleted. A write failure must surface as an
/// error; silently dropping a commit is never acceptable.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every committed row, in commit order.
  fn load_events(
    &self,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Create one row per unit, each with a freshly generated `event_id` and
  /// the shared `meta`, and persist all of them in one pass. Returns the
  /// rows as stored.
  fn commit<'a>(
    &'a self,
    meta: &'a EventMeta,
    units: &'a [UnitId],
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + 'a;

  /// Human-readable description of where rows live, for logs.
  fn describe(&self) -> String;
}
