//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase
//! strings. Unit ids use their display form (`EBAR007`).

use chrono::NaiveDate;
use ebar_core::{
  event::{Event, EventMeta},
  unit::UnitId,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from, or about to be written to, an `events` row.
pub struct RawEvent {
  pub event_id:        String,
  pub event_name:      String,
  pub venue:           String,
  pub location:        String,
  pub delivery_date:   String,
  pub event_date:      String,
  pub collection_date: Option<String>,
  pub assigned_ebar:   String,
}

impl RawEvent {
  pub fn from_event(event: &Event) -> Self {
    Self {
      event_id:        encode_uuid(event.event_id),
      event_name:      event.meta.name.clone(),
      venue:           event.meta.venue.clone(),
      location:        event.meta.location.clone(),
      delivery_date:   encode_date(event.meta.delivery_date),
      event_date:      encode_date(event.meta.event_date),
      collection_date: event.meta.collection_date.map(encode_date),
      assigned_ebar:   event.assigned_unit.to_string(),
    }
  }

  pub fn into_event(self) -> Result<Event> {
    let collection_date = self
      .collection_date
      .as_deref()
      .map(decode_date)
      .transpose()?;

    Ok(Event {
      event_id:      decode_uuid(&self.event_id)?,
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
