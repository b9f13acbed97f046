//! Row encoding for the event table.
//!
//! Dates are written as `YYYY-MM-DD`. On read, anything that starts with an
//! ISO date is accepted, so `2025-07-10 00:00:00` or `2025-07-10T00:00:00`
//! (as spreadsheet and dataframe tools tend to write) load fine. An empty
//! `collection_date` means there is none.

use chrono::NaiveDate;
use ebar_core::{
  event::{Event, EventMeta},
  unit::UnitId,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Header of the persisted table, in column order.
pub const COLUMNS: [&str; 8] = [
  "event_id",
  "event_name",
  "venue",
  "location",
  "delivery_date",
  "event_date",
  "collection_date",
  "assigned_ebar",
];

// ─── Dates ───────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  let head = s.trim().split(['T', ' ']).next().unwrap_or_default();
  NaiveDate::parse_from_str(head, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// One line of the table as plain strings. Field order matches [`COLUMNS`];
/// on read, columns are matched by header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
  pub event_id:        String,
  pub event_name:      String,
  pub venue:           String,
  pub location:        String,
  pub delivery_date:   String,
  pub event_date:      String,
  #[serde(default)]
  pub collection_date: String,
  pub assigned_ebar:   String,
}

impl RawRow {
  pub fn from_event(event: &Event) -> Self {
    Self {
      event_id:        event.event_id.hyphenated().to_string(),
      event_name:      event.meta.name.clone(),
      venue:           event.meta.venue.clone(),
      location:        event.meta.location.clone(),
      delivery_date:   encode_date(event.meta.delivery_date),
      event_date:      encode_date(event.meta.event_date),
      collection_date: event
        .meta
        .collection_date
        .map(encode_date)
        .unwrap_or_default(),
      assigned_ebar:   event.assigned_unit.to_string(),
    }
  }

  pub fn into_event(self) -> Result<Event> {
    let collection_date = match self.collection_date.trim() {
      "" => None,
      s => Some(decode_date(s)?),
    };

    Ok(Event {
      event_id:      Uuid::parse_str(self.event_id.trim())?,
      meta:          EventMeta {
        name: self.event_name,
        venue: self.venue,
        location: self.location,
        delivery_date: decode_date(&self.delivery_date)?,
        event_date: decode_date(&self.event_date)?,
        collection_date,
      },
      assigned_unit: self.assigned_ebar.parse::<UnitId>()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_with_a_time_suffix_are_accepted() {
    let want = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    assert_eq!(decode_date("2025-07-10").unwrap(), want);
    assert_eq!(decode_date("2025-07-10 00:00:00").unwrap(), want);
    assert_eq!(decode_date("2025-07-10T00:00:00").unwrap(), want);
    assert!(decode_date("10/07/2025").is_err());
  }

  #[test]
  fn absent_collection_date_is_an_empty_cell() {
    let event = Event::new(
      EventMeta {
        name:            "Open Day".into(),
        venue:           "Depot".into(),
        location:        "B1 1AA".into(),
        delivery_date:   NaiveDate::from_ymd_opt(2025, 7, 9).unwrap(),
        event_date:      NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
        collection_date: None,
      },
      UnitId::new(4).unwrap(),
    );
    let raw = RawRow::from_event(&event);
    assert_eq!(raw.collection_date, "");
    assert_eq!(raw.assigned_ebar, "EBAR004");
    assert_eq!(raw.into_event().unwrap(), event);
  }
}
