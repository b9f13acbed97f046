//! Handlers for the read-only presentation views.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/calendar` | Optional `?from=YYYY-MM-DD&to=YYYY-MM-DD` |
//! | `GET`  | `/schedule` | Required `?from=..&to=..`, at most [`MAX_SCHEDULE_DAYS`] |
//! | `GET`  | `/map`      | GeoJSON `FeatureCollection` |

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use ebar_core::{event::DateWindow, geo::Geocoder, store::EventStore};
use ebar_engine::views::{CalendarMonth, ScheduleGrid};
use serde::Deserialize;

use crate::{SharedEngine, error::ApiError};

/// Widest window the schedule grid will pivot.
pub const MAX_SCHEDULE_DAYS: u64 = 366;

// ─── Calendar ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CalendarParams {
  pub from: Option<NaiveDate>,
  pub to:   Option<NaiveDate>,
}

/// `GET /calendar[?from=<date>][&to=<date>]`
pub async fn calendar<S, G>(
  State(engine): State<SharedEngine<S, G>>,
  Query(params): Query<CalendarParams>,
) -> Result<Json<Vec<CalendarMonth>>, ApiError>
where
  S: EventStore,
  G: Geocoder,
{
  let window = match (params.from, params.to) {
    (None, None) => None,
    (from, to) => Some(DateWindow::new(
      from.unwrap_or(NaiveDate::MIN),
      to.unwrap_or(NaiveDate::MAX),
    )?),
  };
  Ok(Json(engine.lock().await.calendar(window.as_ref())))
}

// ─── Schedule ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// `GET /schedule?from=<date>&to=<date>`
pub async fn schedule<S, G>(
  State(engine): State<SharedEngine<S, G>>,
  Query(params): Query<ScheduleParams>,
) -> Result<Json<ScheduleGrid>, ApiError>
where
  S: EventStore,
  G: Geocoder,
{
  let window = DateWindow::new(params.from, params.to)?;
  if window.len_days() > MAX_SCHEDULE_DAYS {
    return Err(ApiError::BadRequest(format!(
      "schedule window spans {} days; at most {MAX_SCHEDULE_DAYS} allowed",
      window.len_days()
    )));
  }
  Ok(Json(engine.lock().await.schedule_grid(&window)))
}

// ─── Map ─────────────────────────────────────────────────────────────────────

/// `GET /map`
pub async fn map<S, G>(State(engine): State<SharedEngine<S, G>>) -> Json<serde_json::Value>
where
  S: EventStore,
  G: Geocoder,
{
  Json(engine.lock().await.map_geojson().await)
}
