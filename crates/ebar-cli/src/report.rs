//! Plain-text rendering of engine results for the terminal.

use std::fmt::Write as _;

use ebar_core::event::Event;
use ebar_engine::{
  Suggestion,
  ranker::{ExclusionReason, SENTINEL_DISTANCE_KM},
  views::{CalendarMonth, ScheduleGrid, UnitStatus},
};

pub fn units(statuses: &[UnitStatus]) -> String {
  let mut out = format!("{:<8}  {:>6}  {}\n", "UNIT", "BOOKED", "CURRENT LOCATION");
  for s in statuses {
    let location = match s.current_location.as_deref() {
      None => "(no history)",
      Some("") => "(blank)",
      Some(loc) => loc,
    };
    let _ = writeln!(out, "{:<8}  {:>6}  {}", s.unit.to_string(), s.booked_days, location);
  }
  out
}

pub fn suggestion(s: &Suggestion) -> String {
  let mut out = format!(
    "{} at {} ({}), {} to {}\n",
    s.meta.name,
    s.meta.venue,
    s.meta.location,
    s.meta.delivery_date,
    s.meta.end_date()
  );

  for (rank, c) in s.ranking.candidates.iter().enumerate() {
    let distance = if c.resolved {
      format!("{:.1} km", c.distance_km)
    } else {
      format!("unknown ({SENTINEL_DISTANCE_KM} km)")
    };
    let from = c.current_location.as_deref().unwrap_or("-");
    let _ = writeln!(out, "  {:>2}. {}  {:<18}  from {}", rank + 1, c.unit, distance, from);
  }

  if s.ranking.shortfall() > 0 {
    let _ = writeln!(
      out,
      "  only {} of {} requested units are free",
      s.ranking.candidates.len(),
      s.ranking.required
    );
  }
  for x in &s.ranking.excluded {
    let why = match &x.reason {
      ExclusionReason::Booked { dates } => match dates.first() {
        Some(first) => format!("booked on {first} (+{} more)", dates.len() - 1),
        None => "booked".to_owned(),
      },
      ExclusionReason::AdjacencyConflict { event_date, venue, .. } => {
        format!("due at {venue} on {event_date}")
      }
    };
    let _ = writeln!(out, "  excluded {}: {why}", x.unit);
  }
  out
}

pub fn committed(rows: &[Event]) -> String {
  let mut out = String::new();
  for row in rows {
    let _ = writeln!(out, "{}  {}  {}", row.event_id, row.assigned_unit, row.meta.name);
  }
  out
}

pub fn calendar(months: &[CalendarMonth]) -> String {
  let mut out = String::new();
  for month in months {
    let _ = writeln!(out, "{}", month.label);
    for day in &month.days {
      let _ = writeln!(out, "  {}  {} in use", day.date.format("%a %d"), day.count);
      for e in &day.entries {
        let _ = writeln!(out, "      {}  {} @ {}", e.unit, e.event_name, e.venue);
      }
    }
  }
  out
}

pub fn grid(grid: &ScheduleGrid) -> String {
  let widths: Vec<usize> = (0..grid.labels.len())
    .map(|i| {
      grid
        .rows
        .iter()
        .map(|r| r.cells[i].len())
        .chain([grid.labels[i].len()])
        .max()
        .unwrap_or(0)
    })
    .collect();

  let mut out = format!("{:<8}", "UNIT");
  for (label, w) in grid.labels.iter().zip(widths.iter().copied()) {
    let _ = write!(out, "  {label:<w$}");
  }
  out.push('\n');
  for row in &grid.rows {
    let _ = write!(out, "{:<8}", row.unit.to_string());
    for (cell, w) in row.cells.iter().zip(widths.iter().copied()) {
      let _ = write!(out, "  {cell:<w$}");
    }
    out.push('\n');
  }
  out
}
