//! Handlers for fleet and venue endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/units`  | Fleet order; current location and booked day count |
//! | `GET`  | `/venues` | Registry order |

use axum::{Json, extract::State};
use ebar_core::{geo::Geocoder, store::EventStore, venue::Venue};
use ebar_engine::views::UnitStatus;

use crate::SharedEngine;

/// `GET /units`
pub async fn list<S, G>(State(engine): State<SharedEngine<S, G>>) -> Json<Vec<UnitStatus>>
where
  S: EventStore,
  G: Geocoder,
{
  Json(engine.lock().await.unit_overview())
}

/// `GET /venues`
pub async fn venues<S, G>(State(engine): State<SharedEngine<S, G>>) -> Json<Vec<Venue>>
where
  S: EventStore,
  G: Geocoder,
{
  Json(engine.lock().await.venues().iter().cloned().collect())
}
