//! Nominatim `/search` client.
//!
//! Requests go out one at a time, at least `min_interval` apart, across every
//! clone of the geocoder.

use std::{sync::Arc, time::Duration};

use ebar_core::geo::{Coordinates, GeocodeError, Geocoder};
use reqwest::Client;
use serde::Deserialize;
use tokio::{sync::Mutex, time::Instant};
use tracing::debug;

use crate::Result;

/// Default public endpoint. Its usage policy requires an identifying user
/// agent and at most one request per second.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Connection settings for a Nominatim-compatible service.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
  pub base_url:     String,
  pub user_agent:   String,
  pub timeout:      Duration,
  /// Minimum spacing between two requests.
  pub min_interval: Duration,
}

impl Default for NominatimConfig {
  fn default() -> Self {
    Self {
      base_url:     DEFAULT_BASE_URL.to_owned(),
      user_agent:   concat!("ebar-scheduler/", env!("CARGO_PKG_VERSION")).to_owned(),
      timeout:      Duration::from_secs(10),
      min_interval: Duration::from_secs(1),
    }
  }
}

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
struct Place {
  lat: String,
  lon: String,
}

/// Geocoder backed by the Nominatim `/search` API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based and clones
/// share one request schedule.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
  client:       Client,
  base_url:     String,
  min_interval: Duration,
  last_request: Arc<Mutex<Option<Instant>>>,
}

impl NominatimGeocoder {
  pub fn new(config: NominatimConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout)
      .user_agent(config.user_agent)
      .build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_owned(),
      min_interval: config.min_interval,
      last_request: Arc::new(Mutex::new(None)),
    })
  }

  fn url(&self) -> String { format!("{}/search", self.base_url) }

  /// Wait until `min_interval` has passed since the previous request. The
  /// lock is held across the wait so concurrent callers queue up.
  async fn pace(&self) {
    let mut last = self.last_request.lock().await;
    if let Some(prev) = *last {
      tokio::time::sleep_until(prev + self.min_interval).await;
    }
    *last = Some(Instant::now());
  }
}

impl Geocoder for NominatimGeocoder {
  /// `GET {base}/search?q=<label>&format=json&limit=1`
  async fn resolve(&self, label: &str) -> Result<Coordinates, GeocodeError> {
    let label = label.trim();
    if label.is_empty() {
      return Err(GeocodeError::EmptyLabel);
    }

    self.pace().await;
    let resp = self
      .client
      .get(self.url())
      .query(&[("q", label), ("format", "json"), ("limit", "1")])
      .send()
      .await
      .map_err(|e| GeocodeError::Transport(e.to_string()))?;

    if !resp.status().is_success() {
      return Err(GeocodeError::Transport(format!("GET /search returned {}", resp.status())));
    }

    let places: Vec<Place> = resp
      .json()
      .await
      .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
    let place = places
      .into_iter()
      .next()
      .ok_or_else(|| GeocodeError::NotFound(label.to_owned()))?;

    let coords = parse_place(&place)?;
    debug!(label, lat = coords.lat, lon = coords.lon, "nominatim hit");
    Ok(coords)
  }
}

fn parse_place(place: &Place) -> Result<Coordinates, GeocodeError> {
  let parse = |s: &str| {
    s.trim()
      .parse::<f64>()
      .map_err(|_| GeocodeError::InvalidResponse(format!("bad coordinate {s:?}")))
  };
  let coords = Coordinates::new(parse(&place.lat)?, parse(&place.lon)?);
  if !coords.is_valid() {
    return Err(GeocodeError::InvalidResponse(format!(
      "out-of-range coordinates ({}, {})",
      coords.lat, coords.lon
    )));
  }
  Ok(coords)
}
