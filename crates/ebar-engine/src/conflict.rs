//! Adjacency conflict detection.
//!
//! A unit that is due at another venue within two days of a new event cannot
//! realistically be moved in time, so it must not be offered for that event.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use ebar_core::{event::Event, unit::UnitId, venue::VenueRegistry};

use crate::availability::AvailabilityIndex;

/// How many days after the candidate event date are checked.
pub const ADJACENCY_DAYS: u64 = 2;

/// Answers adjacency questions against a fixed snapshot of committed events.
pub struct ConflictDetector<'a> {
  by_unit: HashMap<UnitId, Vec<&'a Event>>,
  index:   &'a AvailabilityIndex,
  venues:  &'a VenueRegistry,
}

impl<'a> ConflictDetector<'a> {
  pub fn new(
    events: &'a [Event],
    index: &'a AvailabilityIndex,
    venues: &'a VenueRegistry,
  ) -> Self {
    let mut by_unit: HashMap<UnitId, Vec<&'a Event>> = HashMap::new();
    for event in events {
      by_unit.entry(event.assigned_unit).or_default().push(event);
    }
    Self { by_unit, index, venues }
  }

  pub fn has_adjacency_conflict(
    &self,
    unit: UnitId,
    candidate_event_date: NaiveDate,
    candidate_venue: &str,
  ) -> bool {
    self
      .adjacency_conflict(unit, candidate_event_date, candidate_venue)
      .is_some()
  }

  /// The first committed event of `unit` whose event date falls on one of the
  /// next [`ADJACENCY_DAYS`] days and whose venue is neither the candidate
  /// venue nor the place the unit currently is.
  pub fn adjacency_conflict(
    &self,
    unit: UnitId,
    candidate_event_date: NaiveDate,
    candidate_venue: &str,
  ) -> Option<&'a Event> {
    let events = self.by_unit.get(&unit)?;
    let context = self.index.current_location(unit).unwrap_or_default();

    (1..=ADJACENCY_DAYS)
      .filter_map(|i| candidate_event_date.checked_add_days(Days::new(i)))
      .find_map(|day| {
        events
          .iter()
          .copied()
          .filter(|e| e.meta.event_date == day)
          .find(|e| !self.is_at(e, candidate_venue) && !self.is_at(e, context))
      })
  }

  fn is_at(&self, event: &Event, label: &str) -> bool {
    self.venues.same_place(&event.meta.venue, label)
      || self.venues.same_place(&event.meta.location, label)
  }
}

#[cfg(test)]
mod tests {
  use ebar_core::{
    deployment::DeploymentRecord,
    event::EventMeta,
    venue::Venue,
  };

  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn unit(n: u32) -> UnitId { UnitId::new(n).unwrap() }

  fn venues() -> VenueRegistry {
    VenueRegistry::new(vec![
      Venue { name: "Depot".into(), location: "B1 1AA".into() },
      Venue { name: "LFC".into(), location: "L4 0TH".into() },
      Venue { name: "Bath".into(), location: "BA2 6LP".into() },
    ])
  }

  fn booked(u: UnitId, venue: &str, location: &str, on: NaiveDate) -> Event {
    Event::new(
      EventMeta {
        name:            format!("{venue} day"),
        venue:           venue.into(),
        location:        location.into(),
        delivery_date:   on,
        event_date:      on,
        collection_date: None,
      },
      u,
    )
  }

  #[test]
  fn no_prior_events_means_no_conflict() {
    let index = AvailabilityIndex::default();
    let venues = venues();
    let detector = ConflictDetector::new(&[], &index, &venues);
    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "Bath"));
  }

  #[test]
  fn event_elsewhere_within_two_days_conflicts() {
    let records = vec![DeploymentRecord::new(unit(1), d(2025, 7, 1), "Depot")];
    let events = vec![booked(unit(1), "LFC", "L4 0TH", d(2025, 7, 12))];
    let index = AvailabilityIndex::build(&records, &events);
    let venues = venues();
    let detector = ConflictDetector::new(&events, &index, &venues);

    assert!(detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "Bath"));
    assert!(detector.has_adjacency_conflict(unit(1), d(2025, 7, 11), "Bath"));
    // Three days out is fine.
    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 9), "Bath"));
    // The event date itself is not part of the look-ahead.
    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 12), "Bath"));
  }

  #[test]
  fn staying_at_the_same_venue_is_not_a_conflict() {
    let events = vec![booked(unit(1), "LFC", "L4 0TH", d(2025, 7, 11))];
    let index = AvailabilityIndex::build(&[], &events);
    let venues = venues();
    let detector = ConflictDetector::new(&events, &index, &venues);

    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "LFC"));
    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "L4 0TH"));
  }

  #[test]
  fn next_event_at_current_location_is_not_a_conflict() {
    let records = vec![DeploymentRecord::new(unit(1), d(2025, 7, 1), "L4 0TH")];
    let events = vec![booked(unit(1), "LFC", "L4 0TH", d(2025, 7, 11))];
    let index = AvailabilityIndex::build(&records, &events);
    let venues = venues();
    let detector = ConflictDetector::new(&events, &index, &venues);

    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "Bath"));
  }

  #[test]
  fn other_units_events_do_not_count() {
    let events = vec![booked(unit(2), "LFC", "L4 0TH", d(2025, 7, 11))];
    let index = AvailabilityIndex::build(&[], &events);
    let venues = venues();
    let detector = ConflictDetector::new(&events, &index, &venues);

    assert!(!detector.has_adjacency_conflict(unit(1), d(2025, 7, 10), "Bath"));
    assert!(detector.has_adjacency_conflict(unit(2), d(2025, 7, 10), "Bath"));
  }
}
