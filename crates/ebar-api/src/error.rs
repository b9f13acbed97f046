//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ebar_engine::Error> for ApiError {
  fn from(e: ebar_engine::Error) -> Self {
    use ebar_engine::Error;
    match e {
      Error::Core(ebar_core::Error::UnknownVenue(venue)) => {
        ApiError::NotFound(format!("unknown venue {venue:?}"))
      }
      Error::Core(inner) => ApiError::BadRequest(inner.to_string()),
      e @ Error::NothingRequested => ApiError::BadRequest(e.to_string()),
      Error::Persistence(inner) => ApiError::Store(inner),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl From<ebar_core::Error> for ApiError {
  fn from(e: ebar_core::Error) -> Self { ebar_engine::Error::Core(e).into() }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => {
        error!(error = %e, "event store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
