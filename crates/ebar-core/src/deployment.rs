//! Deployment records: historical and ongoing placement facts.
//!
//! Records come from an external planning source and are read-only to the
//! engine. A record with an empty location means the unit is tracked on that
//! date but nobody wrote down where it is; that is different from having no
//! record at all.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::unit::UnitId;

/// One unit placed at one location on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
  pub unit:     UnitId,
  pub date:     NaiveDate,
  /// Free-text location label; empty when the planning cell was blank.
  pub location: String,
}

impl DeploymentRecord {
  pub fn new(unit: UnitId, date: NaiveDate, location: impl Into<String>) -> Self {
    Self { unit, date, location: location.into() }
  }

  /// Whether the planning cell carried a location.
  pub fn has_location(&self) -> bool { !self.location.trim().is_empty() }
}
