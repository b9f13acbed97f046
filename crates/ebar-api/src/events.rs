//! Handlers for `/events`, `/suggestions` and `/refresh`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Commit order |
//! | `POST` | `/events` | Body: `{"meta":{..},"units":["EBAR001"]}` |
//! | `POST` | `/suggestions` | Body: [`SuggestionRequest`]; 404 on unknown venue |
//! | `POST` | `/refresh` | Reload events from the store |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use ebar_core::{
  event::{Event, EventMeta},
  geo::Geocoder,
  store::EventStore,
  unit::UnitId,
};
use ebar_engine::{Suggestion, SuggestionRequest};
use serde::{Deserialize, Serialize};

use crate::{SharedEngine, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /events`
pub async fn list<S, G>(State(engine): State<SharedEngine<S, G>>) -> Json<Vec<Event>>
where
  S: EventStore,
  G: Geocoder,
{
  Json(engine.lock().await.events().to_vec())
}

// ─── Commit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommitBody {
  pub meta:  EventMeta,
  pub units: Vec<UnitId>,
}

/// `POST /events`
pub async fn commit<S, G>(
  State(engine): State<SharedEngine<S, G>>,
  Json(body): Json<CommitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EventStore,
  G: Geocoder,
{
  let rows = engine.lock().await.commit(body.meta, &body.units).await?;
  Ok((StatusCode::CREATED, Json(rows)))
}

// ─── Suggest ─────────────────────────────────────────────────────────────────

/// `POST /suggestions`
pub async fn suggest<S, G>(
  State(engine): State<SharedEngine<S, G>>,
  Json(request): Json<SuggestionRequest>,
) -> Result<Json<Suggestion>, ApiError>
where
  S: EventStore,
  G: Geocoder,
{
  let suggestion = engine.lock().await.suggest(&request).await?;
  Ok(Json(suggestion))
}

// ─── Refresh ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RefreshSummary {
  pub events:  usize,
  pub records: usize,
}

/// `POST /refresh`
pub async fn refresh<S, G>(
  State(engine): State<SharedEngine<S, G>>,
) -> Result<Json<RefreshSummary>, ApiError>
where
  S: EventStore,
  G: Geocoder,
{
  let mut engine = engine.lock().await;
  engine.refresh().await?;
  Ok(Json(RefreshSummary {
    events:  engine.events().len(),
    records: engine.records().len(),
  }))
}
