//! The scheduling engine.
//!
//! [`SchedulingEngine`] owns every piece of session state: the fleet, the
//! venue registry, the deployment records, the committed events, the derived
//! availability index and the geocode cache. Nothing is global. Derived state
//! is rebuilt explicitly through [`SchedulingEngine::refresh`].

use chrono::NaiveDate;
use ebar_core::{
  deployment::DeploymentRecord,
  event::{DateWindow, Event, EventMeta, validate_dates},
  geo::Geocoder,
  store::EventStore,
  unit::{Fleet, UnitId},
  venue::VenueRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
  Error,
  Result,
  availability::AvailabilityIndex,
  conflict::ConflictDetector,
  geocache::GeocodeCache,
  ranker::{RankRequest, Ranker, Ranking},
  views::{self, CalendarMonth, MapPoint, ScheduleGrid, UnitStatus},
};

// ─── Requests ────────────────────────────────────────────────────────────────

/// A request for ranked unit suggestions for a new event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
  pub name:            String,
  /// Must be a name in the venue registry.
  pub venue:           String,
  pub delivery_date:   NaiveDate,
  pub event_date:      NaiveDate,
  #[serde(default)]
  pub collection_date: Option<NaiveDate>,
  pub required:        usize,
}

/// Suggested units together with the event metadata they were ranked for.
/// `meta` is ready to pass to [`SchedulingEngine::commit`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
  pub meta:    EventMeta,
  pub ranking: Ranking,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SchedulingEngine<S, G> {
  fleet:    Fleet,
  venues:   VenueRegistry,
  records:  Vec<DeploymentRecord>,
  events:   Vec<Event>,
  index:    AvailabilityIndex,
  cache:    GeocodeCache,
  store:    S,
  geocoder: G,
}

impl<S: EventStore, G: Geocoder> SchedulingEngine<S, G> {
  /// Load committed events from `store` and build the availability index.
  pub async fn init(
    records: Vec<DeploymentRecord>,
    store: S,
    geocoder: G,
    fleet: Fleet,
    venues: VenueRegistry,
  ) -> Result<Self> {
    let mut engine = Self {
      fleet,
      venues,
      records,
      events: Vec::new(),
      index: AvailabilityIndex::default(),
      cache: GeocodeCache::new(),
      store,
      geocoder,
    };
    engine.refresh().await?;
    Ok(engine)
  }

  /// Reload events from the store and rebuild the availability index from
  /// scratch. The geocode cache survives.
  pub async fn refresh(&mut self) -> Result<()> {
    self.events = self.store.load_events().await.map_err(Error::persistence)?;
    self.index = AvailabilityIndex::build(&self.records, &self.events);
    info!(
      store = %self.store.describe(),
      records = self.records.len(),
      events = self.events.len(),
      fleet = self.fleet.size(),
      "engine state loaded"
    );
    Ok(())
  }

  /// Swap in a new set of deployment records and rebuild the index.
  pub fn replace_records(&mut self, records: Vec<DeploymentRecord>) {
    self.records = records;
    self.index = AvailabilityIndex::build(&self.records, &self.events);
  }

  /// Rank the fleet for a prospective event.
  ///
  /// A short list is not an error; check [`Ranking::shortfall`].
  pub async fn suggest(&mut self, request: &SuggestionRequest) -> Result<Suggestion> {
    if request.required == 0 {
      return Err(Error::NothingRequested);
    }
    validate_dates(request.delivery_date, request.event_date, request.collection_date)?;
    let location = self.venues.require(&request.venue)?.to_owned();

    let meta = EventMeta {
      name: request.name.clone(),
      venue: request.venue.clone(),
      location,
      delivery_date: request.delivery_date,
      event_date: request.event_date,
      collection_date: request.collection_date,
    };
    let window = meta.window()?;

    let units: Vec<UnitId> = self.fleet.units().collect();
    let detector = ConflictDetector::new(&self.events, &self.index, &self.venues);
    let ranker = Ranker {
      index:    &self.index,
      detector: &detector,
      venues:   &self.venues,
      geocoder: &self.geocoder,
    };
    let ranking = ranker
      .rank(&mut self.cache, &units, &RankRequest {
        window,
        event_date: meta.event_date,
        venue: &meta.venue,
        venue_location: &meta.location,
        required: request.required,
      })
      .await;

    info!(
      event = %meta.name,
      venue = %meta.venue,
      required = request.required,
      suggested = ranking.candidates.len(),
      excluded = ranking.excluded.len(),
      "suggestion ranked"
    );
    if ranking.shortfall() > 0 {
      warn!(shortfall = ranking.shortfall(), "fewer eligible units than requested");
    }

    Ok(Suggestion { meta, ranking })
  }

  /// Persist one row per unit for `meta`, then fold the new rows into the
  /// index.
  ///
  /// Units may differ from the suggestion. An override that is already booked
  /// in the window is logged and committed anyway; the caller has made that
  /// decision. Repeated units are collapsed to one row.
  pub async fn commit(&mut self, meta: EventMeta, units: &[UnitId]) -> Result<Vec<Event>> {
    if units.is_empty() {
      return Err(ebar_core::Error::EmptyAssignment.into());
    }
    meta.validate()?;
    let window = meta.window()?;

    let mut assigned: Vec<UnitId> = Vec::with_capacity(units.len());
    for &unit in units {
      self.fleet.check(unit)?;
      if assigned.contains(&unit) {
        warn!(%unit, "unit listed twice; committing once");
        continue;
      }
      let overlap = self.index.overlaps(unit, &window);
      if !overlap.is_empty() {
        warn!(%unit, days = overlap.len(), first = %overlap[0], "committing a unit that is already booked");
      }
      assigned.push(unit);
    }

    let rows = self
      .store
      .commit(&meta, &assigned)
      .await
      .map_err(Error::persistence)?;

    self.index.extend_with_events(&rows);
    self.events.extend(rows.iter().cloned());
    info!(
      event = %meta.name,
      venue = %meta.venue,
      units = rows.len(),
      store = %self.store.describe(),
      "event committed"
    );
    Ok(rows)
  }

  // ─── Views ─────────────────────────────────────────────────────────────────

  pub fn calendar(&self, window: Option<&DateWindow>) -> Vec<CalendarMonth> {
    views::calendar(&self.events, window)
  }

  pub fn schedule_grid(&self, window: &DateWindow) -> ScheduleGrid {
    views::schedule_grid(&self.events, &self.fleet, window)
  }

  pub fn unit_overview(&self) -> Vec<UnitStatus> {
    views::unit_overview(&self.fleet, &self.index)
  }

  pub async fn map_points(&mut self) -> Vec<MapPoint> {
    views::map_points(&self.events, &mut self.cache, &self.geocoder).await
  }

  pub async fn map_geojson(&mut self) -> serde_json::Value {
    views::to_geojson(&self.map_points().await)
  }

  // ─── Accessors ─────────────────────────────────────────────────────────────

  pub fn fleet(&self) -> &Fleet { &self.fleet }

  pub fn venues(&self) -> &VenueRegistry { &self.venues }

  pub fn records(&self) -> &[DeploymentRecord] { &self.records }

  pub fn events(&self) -> &[Event] { &self.events }

  pub fn index(&self) -> &AvailabilityIndex { &self.index }

  pub fn cache(&self) -> &GeocodeCache { &self.cache }

  pub fn store(&self) -> &S { &self.store }
}
