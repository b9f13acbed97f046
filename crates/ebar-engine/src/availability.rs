//! Availability index: per-unit booked dates and current location.
//!
//! Derived, never stored. The index is rebuilt from deployment records and
//! committed events, or extended in place right after a commit so that the
//! next request in the same session sees the new bookings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use ebar_core::{
  deployment::DeploymentRecord,
  event::{DateWindow, Event},
  unit::UnitId,
};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
  booked: BTreeMap<UnitId, BTreeSet<NaiveDate>>,
  /// Latest-dated deployment record per unit: `(date, location)`.
  latest: BTreeMap<UnitId, (NaiveDate, String)>,
}

impl AvailabilityIndex {
  /// Group deployment dates by unit and fold in every event's blocked span.
  pub fn build(records: &[DeploymentRecord], events: &[Event]) -> Self {
    let mut index = Self::default();

    for record in records {
      index.booked.entry(record.unit).or_default().insert(record.date);

      // `>=` so that, on equal dates, the record read last wins.
      let newer = index
        .latest
        .get(&record.unit)
        .is_none_or(|(date, _)| record.date >= *date);
      if newer {
        index
          .latest
          .insert(record.unit, (record.date, record.location.clone()));
      }
    }

    index.extend_with_events(events);
    index
  }

  /// Mark every day of each event's delivery to end span as booked. Rows
  /// whose dates fail validation (e.g. a hand-edited store) are skipped.
  pub fn extend_with_events(&mut self, events: &[Event]) {
    for event in events {
      if let Err(e) = event.meta.validate() {
        warn!(event_id = %event.event_id, error = %e, "skipping event row with invalid dates");
        continue;
      }
      self
        .booked
        .entry(event.assigned_unit)
        .or_default()
        .extend(event.blocked_days());
    }
  }

  /// Dates on which `unit` is committed. Empty for units never seen.
  pub fn dates_for(&self, unit: UnitId) -> impl Iterator<Item = NaiveDate> + '_ {
    self.booked.get(&unit).into_iter().flatten().copied()
  }

  pub fn booked_count(&self, unit: UnitId) -> usize {
    self.booked.get(&unit).map_or(0, BTreeSet::len)
  }

  pub fn is_available(&self, unit: UnitId, date: NaiveDate) -> bool {
    self.booked.get(&unit).is_none_or(|dates| !dates.contains(&date))
  }

  /// Booked dates of `unit` that fall inside `window`, in order.
  pub fn overlaps(&self, unit: UnitId, window: &DateWindow) -> Vec<NaiveDate> {
    self
      .booked
      .get(&unit)
      .map(|dates| dates.range(window.start..=window.end).copied().collect())
      .unwrap_or_default()
  }

  /// Location of the unit's latest-dated deployment record.
  ///
  /// `None` means the unit has no records at all. `Some("")` means the latest
  /// record exists but its location was left blank.
  pub fn current_location(&self, unit: UnitId) -> Option<&str> {
    self.latest.get(&unit).map(|(_, loc)| loc.as_str())
  }
}
