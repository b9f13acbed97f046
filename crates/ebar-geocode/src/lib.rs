//! HTTP geocoding for the EBar scheduler.
//!
//! [`NominatimGeocoder`] talks to any service exposing the Nominatim
//! `/search` endpoint. Combine it with a
//! [`StaticGeocoder`](ebar_core::geo::StaticGeocoder) through
//! [`FallbackGeocoder`](ebar_core::geo::FallbackGeocoder) so that known venues
//! never hit the network.

mod nominatim;

pub mod error;

pub use error::{Error, Result};
pub use nominatim::{DEFAULT_BASE_URL, NominatimConfig, NominatimGeocoder};

#[cfg(test)]
mod tests;
