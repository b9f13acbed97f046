//! Tests for `NominatimGeocoder` against a local stand-in service.

use std::{
  collections::HashMap,
  time::{Duration, Instant},
};

use axum::{
  Json,
  Router,
  extract::Query,
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::get,
};
use ebar_core::geo::{Coordinates, GeocodeError, Geocoder};
use serde_json::json;

use crate::{NominatimConfig, NominatimGeocoder};

async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
  assert_eq!(params.get("format").map(String::as_str), Some("json"));
  assert_eq!(params.get("limit").map(String::as_str), Some("1"));

  match params.get("q").map(String::as_str) {
    Some("BA2 6LP") => Json(json!([{ "lat": "51.3781", "lon": "-2.3597", "display_name": "Bath" }]))
      .into_response(),
    Some("garbage") => Json(json!([{ "lat": "north", "lon": "-2.0" }])).into_response(),
    Some("broken") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    _ => Json(json!([])).into_response(),
  }
}

/// Serve the stand-in on an ephemeral port and return a geocoder pointing at it.
async fn geocoder() -> NominatimGeocoder { spaced_geocoder(Duration::ZERO).await }

async fn spaced_geocoder(min_interval: Duration) -> NominatimGeocoder {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  let app = Router::new().route("/search", get(search));
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

  NominatimGeocoder::new(NominatimConfig {
    base_url: format!("http://{addr}/"),
    user_agent: "ebar-tests".into(),
    timeout: Duration::from_secs(5),
    min_interval,
  })
  .unwrap()
}

#[tokio::test]
async fn resolves_first_hit() {
  let g = geocoder().await;
  assert_eq!(g.resolve("BA2 6LP").await, Ok(Coordinates::new(51.3781, -2.3597)));
}

#[tokio::test]
async fn empty_result_is_not_found() {
  let g = geocoder().await;
  assert_eq!(g.resolve("Atlantis").await, Err(GeocodeError::NotFound("Atlantis".into())));
}

#[tokio::test]
async fn empty_label_never_leaves_the_process() {
  let g = geocoder().await;
  assert_eq!(g.resolve("   ").await, Err(GeocodeError::EmptyLabel));
}

#[tokio::test]
async fn unparseable_coordinates_are_invalid() {
  let g = geocoder().await;
  assert!(matches!(g.resolve("garbage").await, Err(GeocodeError::InvalidResponse(_))));
}

#[tokio::test]
async fn server_errors_are_transport_failures() {
  let g = geocoder().await;
  assert!(matches!(g.resolve("broken").await, Err(GeocodeError::Transport(_))));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
  let g = NominatimGeocoder::new(NominatimConfig {
    base_url: "http://127.0.0.1:1".into(),
    timeout: Duration::from_secs(2),
    ..NominatimConfig::default()
  })
  .unwrap();
  assert!(matches!(g.resolve("BA2 6LP").await, Err(GeocodeError::Transport(_))));
}

#[tokio::test]
async fn requests_are_spaced_out_across_clones() {
  let g = spaced_geocoder(Duration::from_millis(200)).await;
  let twin = g.clone();

  let started = Instant::now();
  assert!(g.resolve("BA2 6LP").await.is_ok());
  assert!(twin.resolve("Atlantis").await.is_err());
  assert!(g.resolve("BA2 6LP").await.is_ok());
  assert!(started.elapsed() >= Duration::from_millis(400));

  // Blank labels are answered locally and do not wait their turn.
  let before = Instant::now();
  assert_eq!(g.resolve("").await, Err(GeocodeError::EmptyLabel));
  assert!(before.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn status_errors_name_the_status() {
  let g = geocoder().await;
  let Err(GeocodeError::Transport(message)) = g.resolve("broken").await else {
    panic!("expected a transport failure");
  };
  assert_eq!(message, "GET /search returned 503 Service Unavailable");
}
