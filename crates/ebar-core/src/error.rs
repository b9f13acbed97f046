//! Error types for `ebar-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid unit identifier: {0:?}")]
  InvalidUnitId(String),

  #[error("unit {unit} is not part of a fleet of {fleet_size}")]
  UnitOutsideFleet { unit: String, fleet_size: u32 },

  #[error("delivery date {delivery} is after event date {event}")]
  DeliveryAfterEvent { delivery: NaiveDate, event: NaiveDate },

  #[error("collection date {collection} is before event date {event}")]
  CollectionBeforeEvent {
    event:      NaiveDate,
    collection: NaiveDate,
  },

  #[error("event spans {days} days; at most {max} allowed")]
  WindowTooLong { days: u64, max: u64 },

  #[error("window start {start} is after window end {end}")]
  InvertedWindow { start: NaiveDate, end: NaiveDate },

  #[error("an event needs at least one assigned unit")]
  EmptyAssignment,

  #[error("unknown venue: {0:?}")]
  UnknownVenue(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
