//! Events: scheduled needs for one or more units at a venue.
//!
//! A multi-unit event is stored as one [`Event`] row per assigned unit. The
//! rows share their [`EventMeta`] but each carries its own `event_id`. Rows
//! are never updated or deleted once committed.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, unit::UnitId};

/// Longest delivery to collection span one event may book, in days.
pub const MAX_EVENT_SPAN_DAYS: u64 = 366;

// ─── DateWindow ──────────────────────────────────────────────────────────────

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateWindow {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvertedWindow { start, end });
    }
    Ok(Self { start, end })
  }

  /// A window covering exactly one day.
  pub fn single(day: NaiveDate) -> Self { Self { start: day, end: day } }

  pub fn contains(&self, day: NaiveDate) -> bool {
    self.start <= day && day <= self.end
  }

  /// Every day in the window, in order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
    self.start.iter_days().take_while(move |d| *d <= self.end)
  }

  pub fn len_days(&self) -> u64 {
    (self.end - self.start).num_days() as u64 + 1
  }
}

// ─── EventMeta ───────────────────────────────────────────────────────────────

/// The metadata shared by every row of one scheduled event.
///
/// Invariant: `delivery_date <= event_date <= collection_date` (when present).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
  pub name:            String,
  pub venue:           String,
  /// Geocodable label for the venue, usually a postcode.
  pub location:        String,
  pub delivery_date:   NaiveDate,
  pub event_date:      NaiveDate,
  pub collection_date: Option<NaiveDate>,
}

impl EventMeta {
  /// Check the date ordering invariant.
  pub fn validate(&self) -> Result<()> {
    validate_dates(self.delivery_date, self.event_date, self.collection_date)
  }

  /// Last day the units are committed: collection, or the event itself.
  pub fn end_date(&self) -> NaiveDate {
    self.collection_date.unwrap_or(self.event_date)
  }

  /// The delivery to end span that blocks assigned units.
  pub fn window(&self) -> Result<DateWindow> {
    DateWindow::new(self.delivery_date, self.end_date())
  }
}

/// Check `delivery <= event <= collection` and that the whole span is at most
/// [`MAX_EVENT_SPAN_DAYS`] long.
pub fn validate_dates(
  delivery: NaiveDate,
  event: NaiveDate,
  collection: Option<NaiveDate>,
) -> Result<()> {
  if delivery > event {
    return Err(Error::DeliveryAfterEvent { delivery, event });
  }
  if let Some(collection) = collection
    && collection < event
  {
    return Err(Error::CollectionBeforeEvent { event, collection });
  }
  let end = collection.unwrap_or(event);
  let days = (end - delivery).num_days() as u64 + 1;
  if days > MAX_EVENT_SPAN_DAYS {
    return Err(Error::WindowTooLong { days, max: MAX_EVENT_SPAN_DAYS });
  }
  Ok(())
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// One committed (event, unit) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:      Uuid,
  #[serde(flatten)]
  pub meta:          EventMeta,
  pub assigned_unit: UnitId,
}

impl Event {
  /// Create a row with a fresh random id.
  pub fn new(meta: EventMeta, assigned_unit: UnitId) -> Self {
    Self { event_id: Uuid::new_v4(), meta, assigned_unit }
  }

  /// Every day this row keeps its unit busy.
  pub fn blocked_days(&self) -> Vec<NaiveDate> {
    let end = self.meta.end_date();
    let mut days = Vec::new();
    let mut day = self.meta.delivery_date;
    while day <= end {
      days.push(day);
      match day.checked_add_days(Days::new(1)) {
        Some(next) => day = next,
        None => break,
      }
    }
    days
  }
}
