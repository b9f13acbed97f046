//! Error type for `ebar-geocode`.
//!
//! Only construction can fail here. Lookup failures are reported as
//! [`GeocodeError`](ebar_core::geo::GeocodeError) values.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
