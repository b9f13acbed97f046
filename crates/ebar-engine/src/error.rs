//! Error type for `ebar-engine`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] ebar_core::Error),

  /// The event store refused a read or write. This is the one failure that
  /// must reach the user: a lost commit is never acceptable.
  #[error("event store error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("deployment source error: {0}")]
  Source(#[from] csv::Error),

  #[error("deployment workbook error: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("requested unit count must be at least 1")]
  NothingRequested,
}

impl Error {
  pub fn persistence<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
