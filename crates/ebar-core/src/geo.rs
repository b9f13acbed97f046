//! Coordinates, great-circle distance, and the geocoder seam.
//!
//! Geocoding is an unreliable external collaborator. Every adapter returns an
//! explicit [`GeocodeError`] instead of hiding failure; the caller decides
//! whether to degrade (sentinel distance, omitted map point) or not.

use std::{collections::HashMap, f64::consts::PI, future::Future};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lon: f64,
}

impl Coordinates {
  pub fn new(lat: f64, lon: f64) -> Self { Self { lat, lon } }

  /// Latitude within ±90°, longitude within ±180°, both finite.
  pub fn is_valid(&self) -> bool {
    self.lat.is_finite()
      && self.lon.is_finite()
      && (-90.0..=90.0).contains(&self.lat)
      && (-180.0..=180.0).contains(&self.lon)
  }

  /// Haversine distance to `other` in kilometres.
  pub fn distance_km(&self, other: &Coordinates) -> f64 {
    haversine_km(self.lat, self.lon, other.lat, other.lon)
  }
}

/// Haversine distance between two points in km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
  let lat1_rad = lat1 * PI / 180.0;
  let lat2_rad = lat2 * PI / 180.0;
  let dlat = (lat2 - lat1) * PI / 180.0;
  let dlon = (lon2 - lon1) * PI / 180.0;

  let a = (dlat / 2.0).sin().powi(2)
    + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
  let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

  EARTH_RADIUS_KM * c
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
  #[error("empty location label")]
  EmptyLabel,

  #[error("no match for {0:?}")]
  NotFound(String),

  #[error("geocoding transport failure: {0}")]
  Transport(String),

  #[error("geocoder returned an unusable response: {0}")]
  InvalidResponse(String),
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Resolves a location label (postcode, address) to coordinates.
///
/// Implementations must never panic on bad input or network trouble.
pub trait Geocoder: Send + Sync {
  fn resolve<'a>(
    &'a self,
    label: &'a str,
  ) -> impl Future<Output = Result<Coordinates, GeocodeError>> + Send + 'a;
}

// ─── StaticGeocoder ──────────────────────────────────────────────────────────

/// Table-driven geocoder. Labels match ignoring case and whitespace.
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
  table: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
  pub fn new() -> Self { Self::default() }

  pub fn with(mut self, label: &str, coords: Coordinates) -> Self {
    self.insert(label, coords);
    self
  }

  pub fn insert(&mut self, label: &str, coords: Coordinates) {
    self.table.insert(key(label), coords);
  }

  pub fn len(&self) -> usize { self.table.len() }

  pub fn is_empty(&self) -> bool { self.table.is_empty() }

  fn lookup(&self, label: &str) -> Result<Coordinates, GeocodeError> {
    let k = key(label);
    if k.is_empty() {
      return Err(GeocodeError::EmptyLabel);
    }
    self
      .table
      .get(&k)
      .copied()
      .ok_or_else(|| GeocodeError::NotFound(label.to_owned()))
  }
}

impl FromIterator<(String, Coordinates)> for StaticGeocoder {
  fn from_iter<T: IntoIterator<Item = (String, Coordinates)>>(iter: T) -> Self {
    let mut g = Self::new();
    for (label, coords) in iter {
      g.insert(&label, coords);
    }
    g
  }
}

impl Geocoder for StaticGeocoder {
  async fn resolve(&self, label: &str) -> Result<Coordinates, GeocodeError> {
    self.lookup(label)
  }
}

fn key(label: &str) -> String {
  label
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect()
}

// ─── FallbackGeocoder ────────────────────────────────────────────────────────

/// Tries `primary` first and consults `secondary` only when it fails.
#[derive(Debug, Clone)]
pub struct FallbackGeocoder<P, S> {
  pub primary:   P,
  pub secondary: S,
}

impl<P: Geocoder, S: Geocoder> Geocoder for FallbackGeocoder<P, S> {
  async fn resolve(&self, label: &str) -> Result<Coordinates, GeocodeError> {
    match self.primary.resolve(label).await {
      Ok(coords) => Ok(coords),
      Err(GeocodeError::EmptyLabel) => Err(GeocodeError::EmptyLabel),
      Err(_) => self.secondary.resolve(label).await,
    }
  }
}
