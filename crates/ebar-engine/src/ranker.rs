//! Candidate ranking.
//!
//! Filters the fleet down to units that are free for the whole requested
//! window and have no adjacency conflict, then orders the survivors by
//! great-circle distance from their current location to the venue.

use chrono::NaiveDate;
use ebar_core::{
  event::DateWindow,
  geo::Geocoder,
  unit::UnitId,
  venue::VenueRegistry,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
  availability::AvailabilityIndex,
  conflict::ConflictDetector,
  geocache::GeocodeCache,
};

/// Distance given to a unit whose location or venue cannot be geocoded. Large
/// enough to rank it after every resolvable candidate without dropping it.
pub const SENTINEL_DISTANCE_KM: f64 = 9999.0;

// ─── Types ───────────────────────────────────────────────────────────────────

/// What to rank for.
#[derive(Debug, Clone)]
pub struct RankRequest<'a> {
  /// Delivery to end span that must be entirely free.
  pub window:         DateWindow,
  pub event_date:     NaiveDate,
  /// Venue name, used for adjacency checks.
  pub venue:          &'a str,
  /// Geocodable label of the venue.
  pub venue_location: &'a str,
  pub required:       usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
  pub unit:             UnitId,
  pub distance_km:      f64,
  /// `false` when [`SENTINEL_DISTANCE_KM`] stands in for a real distance.
  pub resolved:         bool,
  pub current_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
  /// Already committed on these days of the window.
  Booked { dates: Vec<NaiveDate> },
  /// Due at another venue right after the event.
  AdjacencyConflict {
    event_id:   Uuid,
    event_date: NaiveDate,
    venue:      String,
  },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exclusion {
  pub unit:   UnitId,
  #[serde(flatten)]
  pub reason: ExclusionReason,
}

/// Ranked suggestions, at most `required` long.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
  pub candidates: Vec<RankedCandidate>,
  pub required:   usize,
  pub excluded:   Vec<Exclusion>,
}

impl Ranking {
  pub fn units(&self) -> Vec<UnitId> {
    self.candidates.iter().map(|c| c.unit).collect()
  }

  /// How many units short of the request this ranking is. Under-allocation
  /// is not an error; the caller decides what to do with a short list.
  pub fn shortfall(&self) -> usize {
    self.required.saturating_sub(self.candidates.len())
  }
}

// ─── Ranker ──────────────────────────────────────────────────────────────────

pub struct Ranker<'a, G> {
  pub index:    &'a AvailabilityIndex,
  pub detector: &'a ConflictDetector<'a>,
  pub venues:   &'a VenueRegistry,
  pub geocoder: &'a G,
}

impl<G: Geocoder> Ranker<'_, G> {
  /// Rank `units` (given in fleet order) for `request`.
  ///
  /// Never returns more than `request.required` candidates. Equal distances
  /// keep their input order.
  pub async fn rank(
    &self,
    cache: &mut GeocodeCache,
    units: &[UnitId],
    request: &RankRequest<'_>,
  ) -> Ranking {
    let mut excluded = Vec::new();
    let mut eligible = Vec::new();

    for &unit in units {
      let overlap = self.index.overlaps(unit, &request.window);
      if !overlap.is_empty() {
        debug!(%unit, days = overlap.len(), "excluded: booked in window");
        excluded.push(Exclusion {
          unit,
          reason: ExclusionReason::Booked { dates: overlap },
        });
        continue;
      }
      if let Some(conflict) =
        self
          .detector
          .adjacency_conflict(unit, request.event_date, request.venue)
      {
        debug!(%unit, event = %conflict.event_id, "excluded: adjacency conflict");
        excluded.push(Exclusion {
          unit,
          reason: ExclusionReason::AdjacencyConflict {
            event_id:   conflict.event_id,
            event_date: conflict.meta.event_date,
            venue:      conflict.meta.venue.clone(),
          },
        });
        continue;
      }
      eligible.push(unit);
    }

    let venue_coords = cache.resolve(self.geocoder, request.venue_location).await.ok();

    let mut candidates = Vec::with_capacity(eligible.len());
    for unit in eligible {
      let current = self.index.current_location(unit).map(str::to_owned);
      let here = match (&venue_coords, current.as_deref()) {
        (Some(_), Some(loc)) => {
          let label = self.venues.resolve_label(loc).to_owned();
          cache.resolve(self.geocoder, &label).await.ok()
        }
        _ => None,
      };

      let (distance_km, resolved) = match (here, venue_coords) {
        (Some(a), Some(b)) => (a.distance_km(&b), true),
        _ => (SENTINEL_DISTANCE_KM, false),
      };
      debug!(%unit, distance_km, resolved, "ranked");

      candidates.push(RankedCandidate {
        unit,
        distance_km,
        resolved,
        current_location: current,
      });
    }

    // `sort_by` is stable, so ties keep fleet order.
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates.truncate(request.required);

    Ranking { candidates, required: request.required, excluded }
  }
}
