//! Runtime configuration.
//!
//! Layered from an optional TOML file and `EBAR_`-prefixed environment
//! variables, e.g. `EBAR_SERVER__PORT=9000` or `EBAR_STORE__BACKEND=sqlite`.
//! Every field has a default, so an empty configuration is valid (but has an
//! empty venue registry).

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use ebar_core::{geo::Coordinates, unit::DEFAULT_FLEET_SIZE, venue::VenueRegistry};
use ebar_engine::history::GridLayout;
use ebar_geocode::{DEFAULT_BASE_URL, NominatimConfig};
use serde::Deserialize;

pub const DEFAULT_SHEET: &str = "Deployment Plan 2025";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub server:     ServerSettings,
  pub fleet_size: u32,
  pub deployment: DeploymentSettings,
  pub store:      StoreSettings,
  pub geocoder:   GeocoderSettings,
  pub venues:     VenueRegistry,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      server:     ServerSettings::default(),
      fleet_size: DEFAULT_FLEET_SIZE,
      deployment: DeploymentSettings::default(),
      store:      StoreSettings::default(),
      geocoder:   GeocoderSettings::default(),
      venues:     VenueRegistry::default(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
  pub host: String,
  pub port: u16,
}

impl Default for ServerSettings {
  fn default() -> Self { Self { host: "127.0.0.1".into(), port: 8080 } }
}

/// Where the planning sheet lives and how it is laid out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeploymentSettings {
  /// Workbook (`.xlsx`, `.xls`, `.ods`) or CSV export. No history is loaded
  /// when unset.
  pub path:   Option<PathBuf>,
  /// Worksheet to read from a workbook; ignored for CSV.
  pub sheet:  String,
  pub layout: GridLayout,
}

impl Default for DeploymentSettings {
  fn default() -> Self {
    Self {
      path:   None,
      sheet:  DEFAULT_SHEET.to_owned(),
      layout: GridLayout::default(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Csv,
  Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
  pub backend: Backend,
  pub path:    PathBuf,
}

impl Default for StoreSettings {
  fn default() -> Self { Self { backend: Backend::Csv, path: PathBuf::from("events.csv") } }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeocoderSettings {
  pub base_url:     String,
  pub user_agent:   String,
  pub timeout_secs: u64,
  /// Minimum spacing between two remote lookups.
  pub interval_ms:  u64,
  /// Never touch the network; only `fixed` entries resolve.
  pub offline:      bool,
  /// Label to coordinates pairs answered without a lookup.
  pub fixed:        HashMap<String, Coordinates>,
}

impl Default for GeocoderSettings {
  fn default() -> Self {
    let defaults = NominatimConfig::default();
    Self {
      base_url:     DEFAULT_BASE_URL.to_owned(),
      user_agent:   defaults.user_agent,
      timeout_secs: defaults.timeout.as_secs(),
      interval_ms:  defaults.min_interval.as_millis() as u64,
      offline:      false,
      fixed:        HashMap::new(),
    }
  }
}

impl GeocoderSettings {
  pub fn nominatim(&self) -> NominatimConfig {
    NominatimConfig {
      base_url:     self.base_url.clone(),
      user_agent:   self.user_agent.clone(),
      timeout:      Duration::from_secs(self.timeout_secs),
      min_interval: Duration::from_millis(self.interval_ms),
    }
  }
}

impl Settings {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let raw = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("EBAR")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = raw
      .try_deserialize()
      .context("failed to deserialise settings")?;

    settings.store.path = expand_tilde(&settings.store.path);
    settings.deployment.path = settings.deployment.path.as_deref().map(expand_tilde);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(settings.fleet_size, DEFAULT_FLEET_SIZE);
    assert_eq!(settings.store.backend, Backend::Csv);
    assert_eq!(settings.deployment.layout, GridLayout::default());
    assert_eq!(settings.deployment.sheet, "Deployment Plan 2025");
    assert_eq!(settings.geocoder.nominatim().min_interval, Duration::from_secs(1));
    assert!(settings.venues.is_empty());
  }

  #[test]
  fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ebar.toml");
    std::fs::write(
      &path,
      r#"
fleet_size = 12

[store]
backend = "sqlite"
path = "~/ebar/events.db"

[deployment]
path = "plan.xlsx"
sheet = "Deployment Plan 2026"

[deployment.layout]
header_row = 0

[geocoder]
offline = true

[geocoder.fixed]
"BA2 6LP" = { lat = 51.3781, lon = -2.3597 }

[[venues]]
name = "Bath"
location = "BA2 6LP"
"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(settings.fleet_size, 12);
    assert_eq!(settings.store.backend, Backend::Sqlite);
    assert!(!settings.store.path.starts_with("~"));
    assert_eq!(settings.deployment.sheet, "Deployment Plan 2026");
    assert_eq!(settings.deployment.layout.header_row, 0);
    assert_eq!(settings.deployment.layout.unit_column, 1);
    assert!(settings.geocoder.offline);
    assert_eq!(settings.geocoder.fixed.len(), 1);
    assert_eq!(settings.venues.location_of("Bath"), Some("BA2 6LP"));
  }
}
