//! Session cache in front of a [`Geocoder`].
//!
//! Each distinct label is resolved at most once per session. Failures are
//! cached as well: a geocoder that timed out for a label will not be asked
//! again until the cache is cleared.

use std::collections::HashMap;

use ebar_core::geo::{Coordinates, GeocodeError, Geocoder};
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct GeocodeCache {
  entries: HashMap<String, Result<Coordinates, GeocodeError>>,
  lookups: usize,
}

impl GeocodeCache {
  pub fn new() -> Self { Self::default() }

  /// Resolve `label`, consulting `geocoder` only on a cache miss.
  pub async fn resolve<G: Geocoder>(
    &mut self,
    geocoder: &G,
    label: &str,
  ) -> Result<Coordinates, GeocodeError> {
    let key = label.trim();
    if key.is_empty() {
      return Err(GeocodeError::EmptyLabel);
    }
    if let Some(hit) = self.entries.get(key) {
      return hit.clone();
    }

    self.lookups += 1;
    let outcome = match geocoder.resolve(key).await {
      Ok(coords) if coords.is_valid() => Ok(coords),
      Ok(coords) => Err(GeocodeError::InvalidResponse(format!(
        "out-of-range coordinates ({}, {})",
        coords.lat, coords.lon
      ))),
      Err(e) => Err(e),
    };

    match &outcome {
      Ok(c) => debug!(label = key, lat = c.lat, lon = c.lon, "geocoded"),
      Err(e) => warn!(label = key, error = %e, "geocoding failed"),
    }

    self.entries.insert(key.to_owned(), outcome.clone());
    outcome
  }

  /// Number of times the underlying geocoder was actually called.
  pub fn lookups(&self) -> usize { self.lookups }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn clear(&mut self) { self.entries.clear(); }
}

#[cfg(test)]
mod tests {
  use ebar_core::geo::StaticGeocoder;

  use super::*;

  #[tokio::test]
  async fn each_label_is_looked_up_once() {
    let geocoder = StaticGeocoder::new().with("BA2 6LP", Coordinates::new(51.38, -2.36));
    let mut cache = GeocodeCache::new();

    for _ in 0..3 {
      assert!(cache.resolve(&geocoder, "BA2 6LP").await.is_ok());
      assert!(cache.resolve(&geocoder, "nowhere").await.is_err());
    }
    assert_eq!(cache.lookups(), 2);
    assert_eq!(cache.len(), 2);
  }

  #[tokio::test]
  async fn empty_labels_skip_the_geocoder() {
    let geocoder = StaticGeocoder::new();
    let mut cache = GeocodeCache::new();

    assert_eq!(cache.resolve(&geocoder, "  ").await, Err(GeocodeError::EmptyLabel));
    assert_eq!(cache.lookups(), 0);
  }

  #[tokio::test]
  async fn out_of_range_results_are_rejected() {
    let geocoder = StaticGeocoder::new().with("bad", Coordinates::new(123.0, 0.0));
    let mut cache = GeocodeCache::new();

    assert!(matches!(
      cache.resolve(&geocoder, "bad").await,
      Err(GeocodeError::InvalidResponse(_))
    ));
  }
}
