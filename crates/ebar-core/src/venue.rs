//! Venue registry: fixed mapping from venue name to a geocodable label.
//!
//! The registry is configuration data; the engine never edits it.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A named physical location with the label used to geocode it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
  pub name:     String,
  /// Usually a postcode, e.g. `"BA2 6LP"`.
  pub location: String,
}

/// Ordered venue list. Lookups by name are exact; lookups by label ignore
/// case and whitespace so `"ba26lp"` matches `"BA2 6LP"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueRegistry {
  venues: Vec<Venue>,
}

impl VenueRegistry {
  pub fn new(venues: Vec<Venue>) -> Self { Self { venues } }

  pub fn iter(&self) -> impl Iterator<Item = &Venue> { self.venues.iter() }

  pub fn len(&self) -> usize { self.venues.len() }

  pub fn is_empty(&self) -> bool { self.venues.is_empty() }

  /// Location label for a venue name.
  pub fn location_of(&self, name: &str) -> Option<&str> {
    self
      .venues
      .iter()
      .find(|v| v.name == name)
      .map(|v| v.location.as_str())
  }

  /// Like [`Self::location_of`] but fails with [`Error::UnknownVenue`].
  pub fn require(&self, name: &str) -> Result<&str> {
    self
      .location_of(name)
      .ok_or_else(|| Error::UnknownVenue(name.to_owned()))
  }

  /// Map a free-text location to something geocodable: venue names become
  /// their label, anything else passes through untouched.
  pub fn resolve_label<'a>(&'a self, label: &'a str) -> &'a str {
    self.location_of(label).unwrap_or(label)
  }

  /// The venue a label refers to, whether it is written as the venue name or
  /// as the venue's location label.
  pub fn venue_for(&self, label: &str) -> Option<&Venue> {
    let wanted = normalize(label);
    if wanted.is_empty() {
      return None;
    }
    self
      .venues
      .iter()
      .find(|v| v.name == label || normalize(&v.location) == wanted)
  }

  /// Whether two labels name the same place: equal once normalized, or both
  /// resolving to the same registered venue.
  pub fn same_place(&self, a: &str, b: &str) -> bool {
    let (na, nb) = (normalize(a), normalize(b));
    if na.is_empty() || nb.is_empty() {
      return false;
    }
    if na == nb {
      return true;
    }
    match (self.venue_for(a), self.venue_for(b)) {
      (Some(va), Some(vb)) => va.name == vb.name,
      _ => false,
    }
  }
}

fn normalize(label: &str) -> String {
  label
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> VenueRegistry {
    VenueRegistry::new(vec![
      Venue { name: "Depot".into(), location: "B1 1AA".into() },
      Venue { name: "Bath".into(), location: "BA2 6LP".into() },
    ])
  }

  #[test]
  fn resolves_names_and_passes_through_labels() {
    let r = registry();
    assert_eq!(r.resolve_label("Bath"), "BA2 6LP");
    assert_eq!(r.resolve_label("L4 0TH"), "L4 0TH");
  }

  #[test]
  fn require_reports_unknown_venue() {
    assert!(matches!(registry().require("Nowhere"), Err(Error::UnknownVenue(_))));
  }

  #[test]
  fn same_place_matches_name_against_postcode() {
    let r = registry();
    assert!(r.same_place("Bath", "ba2 6lp"));
    assert!(r.same_place("Bath", "Bath"));
    assert!(!r.same_place("Bath", "Depot"));
    assert!(!r.same_place("", ""));
  }

  #[test]
  fn deserialises_from_a_list() {
    let json = r#"[{"name":"Depot","location":"B1 1AA"}]"#;
    let r: VenueRegistry = serde_json::from_str(json).unwrap();
    assert_eq!(r.location_of("Depot"), Some("B1 1AA"));
  }
}
