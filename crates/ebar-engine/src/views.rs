//! Read-only views for presentation layers.
//!
//! These are pure functions over committed events (plus the fleet or a
//! geocoder where needed). Rendering is somebody else's job.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use ebar_core::{
  event::{DateWindow, Event},
  geo::Geocoder,
  unit::{Fleet, UnitId},
};
use serde::Serialize;
use serde_json::json;

use crate::{availability::AvailabilityIndex, geocache::GeocodeCache};

// ─── Calendar ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
  pub event_name: String,
  pub venue:      String,
  pub unit:       UnitId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
  pub date:    NaiveDate,
  /// Number of (event, unit) rows on this day, i.e. units in use.
  pub count:   usize,
  pub entries: Vec<CalendarEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
  pub year:  i32,
  pub month: u32,
  /// e.g. `"July 2025"`.
  pub label: String,
  pub days:  Vec<CalendarDay>,
}

/// Event rows grouped by month and event date. Days without events are left
/// out. `window`, when given, limits which event dates are included.
pub fn calendar(events: &[Event], window: Option<&DateWindow>) -> Vec<CalendarMonth> {
  let mut by_day: BTreeMap<NaiveDate, Vec<CalendarEntry>> = BTreeMap::new();
  for event in events {
    let date = event.meta.event_date;
    if window.is_some_and(|w| !w.contains(date)) {
      continue;
    }
    by_day.entry(date).or_default().push(CalendarEntry {
      event_name: event.meta.name.clone(),
      venue:      event.meta.venue.clone(),
      unit:       event.assigned_unit,
    });
  }

  let mut months: Vec<CalendarMonth> = Vec::new();
  for (date, entries) in by_day {
    let day = CalendarDay { date, count: entries.len(), entries };
    match months.last_mut() {
      Some(m) if m.year == date.year() && m.month == date.month() => m.days.push(day),
      _ => months.push(CalendarMonth {
        year:  date.year(),
        month: date.month(),
        label: date.format("%B %Y").to_string(),
        days:  vec![day],
      }),
    }
  }
  months
}

// ─── Schedule grid ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleRow {
  pub unit:  UnitId,
  /// One cell per column: comma-joined venues, empty when idle.
  pub cells: Vec<String>,
}

/// Unit × date pivot of event venues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleGrid {
  pub dates:  Vec<NaiveDate>,
  /// Column headers in `DD-MM` form.
  pub labels: Vec<String>,
  pub rows:   Vec<ScheduleRow>,
}

/// Pivot events by assigned unit and event date over `window`. Rows follow
/// fleet order; units outside the fleet are dropped.
pub fn schedule_grid(events: &[Event], fleet: &Fleet, window: &DateWindow) -> ScheduleGrid {
  let dates: Vec<NaiveDate> = window.days().collect();
  let labels = dates.iter().map(|d| d.format("%d-%m").to_string()).collect();

  let mut cells: BTreeMap<(UnitId, NaiveDate), Vec<&str>> = BTreeMap::new();
  for event in events {
    if window.contains(event.meta.event_date) {
      cells
        .entry((event.assigned_unit, event.meta.event_date))
        .or_default()
        .push(event.meta.venue.as_str());
    }
  }

  let rows = fleet
    .units()
    .map(|unit| ScheduleRow {
      unit,
      cells: dates
        .iter()
        .map(|d| cells.get(&(unit, *d)).map(|v| v.join(", ")).unwrap_or_default())
        .collect(),
    })
    .collect();

  ScheduleGrid { dates, labels, rows }
}

// ─── Unit overview ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
  pub unit:             UnitId,
  /// `None` when the unit has no deployment history.
  pub current_location: Option<String>,
  pub booked_days:      usize,
}

pub fn unit_overview(fleet: &Fleet, index: &AvailabilityIndex) -> Vec<UnitStatus> {
  fleet
    .units()
    .map(|unit| UnitStatus {
      unit,
      current_location: index.current_location(unit).map(str::to_owned),
      booked_days: index.booked_count(unit),
    })
    .collect()
}

// ─── Map ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
  pub lat:   f64,
  pub lon:   f64,
  pub event: String,
  pub venue: String,
  pub unit:  UnitId,
}

/// Geocode every event row. Rows whose location cannot be resolved are left
/// off the map rather than failing the view.
pub async fn map_points<G: Geocoder>(
  events: &[Event],
  cache: &mut GeocodeCache,
  geocoder: &G,
) -> Vec<MapPoint> {
  let mut points = Vec::new();
  for event in events {
    if let Ok(c) = cache.resolve(geocoder, &event.meta.location).await {
      points.push(MapPoint {
        lat:   c.lat,
        lon:   c.lon,
        event: event.meta.name.clone(),
        venue: event.meta.venue.clone(),
        unit:  event.assigned_unit,
      });
    }
  }
  points
}

/// Render map points as a GeoJSON `FeatureCollection`.
pub fn to_geojson(points: &[MapPoint]) -> serde_json::Value {
  let features: Vec<serde_json::Value> = points
    .iter()
    .map(|p| {
      json!({
        "type": "Feature",
        "geometry": {
          "type": "Point",
          "coordinates": [p.lon, p.lat]
        },
        "properties": {
          "event": p.event,
          "venue": p.venue,
          "ebar": p.unit,
          "label": format!("{} at {} ({})", p.event, p.venue, p.unit)
        }
      })
    })
    .collect();

  json!({
    "type": "FeatureCollection",
    "features": features
  })
}
