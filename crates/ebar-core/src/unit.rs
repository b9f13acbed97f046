//! Units and the fleet they belong to.
//!
//! A unit carries no mutable state of its own. Everything we know about it
//! (where it is, when it is booked) is derived from deployment records and
//! committed events.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix shared by every unit identifier.
pub const UNIT_PREFIX: &str = "EBAR";

/// Minimum number of digits in the rendered suffix.
pub const SUFFIX_WIDTH: usize = 3;

/// Fleet size used when the configuration does not name one.
pub const DEFAULT_FLEET_SIZE: u32 = 50;

// ─── UnitId ──────────────────────────────────────────────────────────────────

/// A fleet member, rendered as `EBAR` plus a zero-padded number (`EBAR007`).
///
/// Ordering follows the numeric suffix, which is also fleet order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct UnitId(u32);

impl UnitId {
  /// Build a unit id from its fleet number. Zero is not a valid unit.
  pub fn new(number: u32) -> Result<Self> {
    if number == 0 {
      return Err(Error::InvalidUnitId("0".into()));
    }
    Ok(Self(number))
  }

  pub fn number(self) -> u32 { self.0 }

  /// Interpret a raw number read from a planning grid (`7`, `7.0`).
  ///
  /// Fractional, negative, zero and non-finite values are rejected.
  pub fn from_cell_number(value: f64) -> Option<Self> {
    if !value.is_finite() || value.fract() != 0.0 || value < 1.0 {
      return None;
    }
    if value > f64::from(u32::MAX) {
      return None;
    }
    Some(Self(value as u32))
  }
}

impl fmt::Display for UnitId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{UNIT_PREFIX}{:0width$}", self.0, width = SUFFIX_WIDTH)
  }
}

impl FromStr for UnitId {
  type Err = Error;

  /// Accepts `EBAR007` as well as a bare number (`7`, `007`).
  fn from_str(s: &str) -> Result<Self> {
    let trimmed = s.trim();
    let digits = trimmed
      .strip_prefix(UNIT_PREFIX)
      .or_else(|| trimmed.strip_prefix(&UNIT_PREFIX.to_ascii_lowercase()))
      .unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
      return Err(Error::InvalidUnitId(s.to_owned()));
    }
    let number: u32 = digits
      .parse()
      .map_err(|_| Error::InvalidUnitId(s.to_owned()))?;
    Self::new(number).map_err(|_| Error::InvalidUnitId(s.to_owned()))
  }
}

impl TryFrom<String> for UnitId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { value.parse() }
}

impl From<UnitId> for String {
  fn from(value: UnitId) -> Self { value.to_string() }
}

// ─── Fleet ───────────────────────────────────────────────────────────────────

/// The fixed, enumerable set of units `EBAR001..=EBAR{size}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
  size: u32,
}

impl Fleet {
  pub fn new(size: u32) -> Self { Self { size } }

  pub fn size(&self) -> u32 { self.size }

  pub fn contains(&self, unit: UnitId) -> bool { unit.0 <= self.size }

  /// All units in fleet order.
  pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
    (1..=self.size).map(UnitId)
  }

  /// Fail with [`Error::UnitOutsideFleet`] unless `unit` is a member.
  pub fn check(&self, unit: UnitId) -> Result<()> {
    if self.contains(unit) {
      Ok(())
    } else {
      Err(Error::UnitOutsideFleet {
        unit:       unit.to_string(),
        fleet_size: self.size,
      })
    }
  }
}

impl Default for Fleet {
  fn default() -> Self { Self::new(DEFAULT_FLEET_SIZE) }
}
