//! Turns [`Settings`] into a running [`SchedulingEngine`].
//!
//! The backends are picked at runtime, so the engine is instantiated over two
//! small enums that forward to whichever store and geocoder were configured.

use anyhow::Context as _;
use ebar_core::{
  deployment::DeploymentRecord,
  event::{Event, EventMeta},
  geo::{Coordinates, FallbackGeocoder, GeocodeError, Geocoder, StaticGeocoder},
  store::EventStore,
  unit::{Fleet, UnitId},
};
use ebar_engine::{
  SchedulingEngine,
  history::{DeploymentGrid, is_workbook, load_records},
};
use ebar_geocode::NominatimGeocoder;
use ebar_store_csv::CsvStore;
use ebar_store_sqlite::SqliteStore;
use thiserror::Error;
use tracing::{info, warn};

use crate::settings::{Backend, Settings};

pub type Engine = SchedulingEngine<AnyStore, AnyGeocoder>;

// ─── Store ───────────────────────────────────────────────────────────────────

pub enum AnyStore {
  Csv(CsvStore),
  Sqlite(SqliteStore),
}

#[derive(Debug, Error)]
pub enum StoreError {
  #[error(transparent)]
  Csv(#[from] ebar_store_csv::Error),

  #[error(transparent)]
  Sqlite(#[from] ebar_store_sqlite::Error),
}

impl EventStore for AnyStore {
  type Error = StoreError;

  async fn load_events(&self) -> Result<Vec<Event>, StoreError> {
    Ok(match self {
      AnyStore::Csv(s) => s.load_events().await?,
      AnyStore::Sqlite(s) => s.load_events().await?,
    })
  }

  async fn commit(&self, meta: &EventMeta, units: &[UnitId]) -> Result<Vec<Event>, StoreError> {
    Ok(match self {
      AnyStore::Csv(s) => s.commit(meta, units).await?,
      AnyStore::Sqlite(s) => s.commit(meta, units).await?,
    })
  }

  fn describe(&self) -> String {
    match self {
      AnyStore::Csv(s) => s.describe(),
      AnyStore::Sqlite(s) => s.describe(),
    }
  }
}

// ─── Geocoder ────────────────────────────────────────────────────────────────

pub enum AnyGeocoder {
  Offline(StaticGeocoder),
  Online(FallbackGeocoder<StaticGeocoder, NominatimGeocoder>),
}

impl Geocoder for AnyGeocoder {
  async fn resolve(&self, label: &str) -> Result<Coordinates, GeocodeError> {
    match self {
      AnyGeocoder::Offline(g) => g.resolve(label).await,
      AnyGeocoder::Online(g) => g.resolve(label).await,
    }
  }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub async fn open_store(settings: &Settings) -> anyhow::Result<AnyStore> {
  let path = &settings.store.path;
  Ok(match settings.store.backend {
    Backend::Csv => AnyStore::Csv(
      CsvStore::open(path)
        .await
        .with_context(|| format!("failed to open csv store at {path:?}"))?,
    ),
    Backend::Sqlite => AnyStore::Sqlite(
      SqliteStore::open(path)
        .await
        .with_context(|| format!("failed to open sqlite store at {path:?}"))?,
    ),
  })
}

pub fn build_geocoder(settings: &Settings) -> anyhow::Result<AnyGeocoder> {
  let fixed: StaticGeocoder = settings
    .geocoder
    .fixed
    .iter()
    .map(|(label, coords)| (label.clone(), *coords))
    .collect();

  if settings.geocoder.offline {
    info!(entries = fixed.len(), "geocoding offline");
    return Ok(AnyGeocoder::Offline(fixed));
  }

  let remote = NominatimGeocoder::new(settings.geocoder.nominatim())
    .context("failed to build geocoding client")?;
  Ok(AnyGeocoder::Online(FallbackGeocoder { primary: fixed, secondary: remote }))
}

/// Read the planning sheet named in the settings, if any. Workbooks are
/// recognised by extension; anything else is read as a CSV export.
pub fn load_history(settings: &Settings) -> anyhow::Result<Vec<DeploymentRecord>> {
  let Some(path) = &settings.deployment.path else {
    warn!("no deployment sheet configured; starting without history");
    return Ok(Vec::new());
  };
  let grid = if is_workbook(path) {
    DeploymentGrid::from_xlsx_path(path, &settings.deployment.sheet)
  } else {
    DeploymentGrid::from_csv_path(path)
  }
  .with_context(|| format!("failed to read deployment sheet {path:?}"))?;
  let (records, _report) = load_records(&grid, &settings.deployment.layout);
  Ok(records)
}

pub async fn build_engine(settings: &Settings) -> anyhow::Result<Engine> {
  if settings.venues.is_empty() {
    warn!("venue registry is empty; every suggestion will be rejected");
  }
  let records = load_history(settings)?;
  let store = open_store(settings).await?;
  let geocoder = build_geocoder(settings)?;

  SchedulingEngine::init(
    records,
    store,
    geocoder,
    Fleet::new(settings.fleet_size),
    settings.venues.clone(),
  )
  .await
  .context("failed to initialise scheduling engine")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn settings_for(path: std::path::PathBuf) -> Settings {
    let mut settings = Settings::default();
    settings.deployment.path = Some(path);
    settings
  }

  #[test]
  fn history_is_optional() {
    assert!(load_history(&Settings::default()).unwrap().is_empty());
  }

  #[test]
  fn csv_exports_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.csv");
    std::fs::write(&path, "title\n\n,Unit,2025-07-01\n,3,LFC\n").unwrap();

    let records = load_history(&settings_for(path)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].location, "LFC");
  }

  #[test]
  fn workbook_paths_go_through_the_workbook_reader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.xlsx");
    // Valid as CSV, so only the workbook reader rejects it.
    std::fs::write(&path, "title\n\n,Unit,2025-07-01\n,3,LFC\n").unwrap();

    let err = load_history(&settings_for(path)).unwrap_err();
    assert!(format!("{err:#}").contains("deployment workbook error"));
  }
}
