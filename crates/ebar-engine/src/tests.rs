//! End-to-end tests for `SchedulingEngine` against an in-memory event store.

use chrono::NaiveDate;
use ebar_core::{
  deployment::DeploymentRecord,
  event::{DateWindow, Event, EventMeta},
  geo::{Coordinates, StaticGeocoder},
  store::EventStore,
  unit::{Fleet, UnitId},
  venue::{Venue, VenueRegistry},
};
use tokio::sync::Mutex;

use crate::{
  Error,
  SchedulingEngine,
  SuggestionRequest,
  ranker::SENTINEL_DISTANCE_KM,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

/// Keeps rows in memory. With `fail_writes` set every commit is refused.
#[derive(Default)]
struct MemoryStore {
  rows:        Mutex<Vec<Event>>,
  fail_writes: bool,
}

impl MemoryStore {
  fn failing() -> Self { Self { fail_writes: true, ..Self::default() } }
}

impl EventStore for MemoryStore {
  type Error = DiskFull;

  async fn load_events(&self) -> Result<Vec<Event>, DiskFull> {
    Ok(self.rows.lock().await.clone())
  }

  async fn commit(&self, meta: &EventMeta, units: &[UnitId]) -> Result<Vec<Event>, DiskFull> {
    if self.fail_writes {
      return Err(DiskFull);
    }
    let new: Vec<Event> = units.iter().map(|u| Event::new(meta.clone(), *u)).collect();
    self.rows.lock().await.extend(new.iter().cloned());
    Ok(new)
  }

  fn describe(&self) -> String { "memory".into() }
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn unit(n: u32) -> UnitId { UnitId::new(n).unwrap() }

fn venues() -> VenueRegistry {
  VenueRegistry::new(vec![
    Venue { name: "Depot".into(), location: "B1 1AA".into() },
    Venue { name: "LFC".into(), location: "L4 0TH".into() },
    Venue { name: "Bath".into(), location: "BA2 6LP".into() },
    Venue { name: "Nowhere".into(), location: "ZZ99 9ZZ".into() },
  ])
}

fn geocoder() -> StaticGeocoder {
  StaticGeocoder::new()
    .with("B1 1AA", Coordinates::new(52.4796, -1.9026))
    .with("L4 0TH", Coordinates::new(53.4308, -2.9608))
    .with("BA2 6LP", Coordinates::new(51.3781, -2.3597))
}

async fn engine_with(
  records: Vec<DeploymentRecord>,
  store: MemoryStore,
  fleet_size: u32,
) -> SchedulingEngine<MemoryStore, StaticGeocoder> {
  SchedulingEngine::init(records, store, geocoder(), Fleet::new(fleet_size), venues())
    .await
    .expect("engine init")
}

fn request(venue: &str, on: NaiveDate, required: usize) -> SuggestionRequest {
  SuggestionRequest {
    name: "Cup Final".into(),
    venue: venue.into(),
    delivery_date: on,
    event_date: on,
    collection_date: None,
    required,
  }
}

// ─── Suggestions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn booked_unit_is_excluded_from_overlapping_window() {
  let records = vec![DeploymentRecord::new(unit(1), d(2025, 7, 10), "Depot")];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;

  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 2)).await.unwrap();
  assert_eq!(s.ranking.units(), vec![unit(2)]);
  assert_eq!(s.meta.location, "BA2 6LP");
}

#[tokio::test]
async fn unresolvable_venue_keeps_every_candidate_with_sentinel_distance() {
  let records = vec![
    DeploymentRecord::new(unit(1), d(2025, 7, 1), "LFC"),
    DeploymentRecord::new(unit(2), d(2025, 7, 1), "Bath"),
  ];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;

  let s = engine.suggest(&request("Nowhere", d(2025, 7, 10), 2)).await.unwrap();
  assert_eq!(s.ranking.units(), vec![unit(1), unit(2)]);
  assert!(
    s.ranking
      .candidates
      .iter()
      .all(|c| c.distance_km == SENTINEL_DISTANCE_KM && !c.resolved)
  );
}

#[tokio::test]
async fn under_allocation_is_not_an_error() {
  let records = vec![
    DeploymentRecord::new(unit(1), d(2025, 7, 10), "Depot"),
    DeploymentRecord::new(unit(2), d(2025, 7, 10), "Depot"),
  ];
  let mut engine = engine_with(records, MemoryStore::default(), 3).await;

  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 3)).await.unwrap();
  assert_eq!(s.ranking.units(), vec![unit(3)]);
  assert_eq!(s.ranking.shortfall(), 2);
}

#[tokio::test]
async fn equidistant_units_keep_fleet_order() {
  let records = vec![
    DeploymentRecord::new(unit(2), d(2025, 7, 1), "Depot"),
    DeploymentRecord::new(unit(1), d(2025, 7, 1), "Depot"),
  ];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;

  let s = engine.suggest(&request("LFC", d(2025, 7, 10), 2)).await.unwrap();
  assert_eq!(s.ranking.units(), vec![unit(1), unit(2)]);
}

#[tokio::test]
async fn suggestions_never_exceed_requested_count() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 50).await;

  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 4)).await.unwrap();
  assert_eq!(s.ranking.candidates.len(), 4);
}

#[tokio::test]
async fn unknown_venue_is_rejected() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;

  let err = engine.suggest(&request("Wembley", d(2025, 7, 10), 1)).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::UnknownVenue(_))));
}

#[tokio::test]
async fn zero_units_requested_is_rejected() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;

  let err = engine.suggest(&request("Bath", d(2025, 7, 10), 0)).await.unwrap_err();
  assert!(matches!(err, Error::NothingRequested));
}

#[tokio::test]
async fn inverted_dates_are_rejected() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;
  let mut req = request("Bath", d(2025, 7, 10), 1);
  req.delivery_date = d(2025, 7, 11);

  let err = engine.suggest(&req).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::DeliveryAfterEvent { .. })));
}

// ─── Commit ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn commit_folds_new_bookings_into_the_index() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;

  let mut req = request("Bath", d(2025, 7, 10), 1);
  req.collection_date = Some(d(2025, 7, 12));
  let s = engine.suggest(&req).await.unwrap();
  assert_eq!(s.ranking.units(), vec![unit(1)]);

  let rows = engine.commit(s.meta, &s.ranking.units()).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(engine.events().len(), 1);
  assert!(!engine.index().is_available(unit(1), d(2025, 7, 12)));

  // The same session now sees unit 1 as busy.
  let again = engine.suggest(&request("Bath", d(2025, 7, 11), 2)).await.unwrap();
  assert_eq!(again.ranking.units(), vec![unit(2)]);
}

#[tokio::test]
async fn committed_rows_share_metadata_with_unique_ids() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 3).await;
  let s = engine.suggest(&request("LFC", d(2025, 8, 1), 3)).await.unwrap();

  let rows = engine.commit(s.meta.clone(), &s.ranking.units()).await.unwrap();
  assert_eq!(rows.len(), 3);
  assert!(rows.iter().all(|r| r.meta == s.meta));
  assert_ne!(rows[0].event_id, rows[1].event_id);
  assert_ne!(rows[1].event_id, rows[2].event_id);
}

#[tokio::test]
async fn refresh_reloads_the_same_state() {
  let records = vec![DeploymentRecord::new(unit(1), d(2025, 7, 1), "Depot")];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;
  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 2)).await.unwrap();
  engine.commit(s.meta, &s.ranking.units()).await.unwrap();

  let events_before = engine.events().to_vec();
  let index_before = engine.index().clone();
  engine.refresh().await.unwrap();

  assert_eq!(engine.events(), events_before.as_slice());
  assert_eq!(engine.index(), &index_before);
}

#[tokio::test]
async fn commit_rejects_bad_assignments() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;
  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 1)).await.unwrap();

  let err = engine.commit(s.meta.clone(), &[]).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::EmptyAssignment)));

  let err = engine.commit(s.meta.clone(), &[unit(3)]).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::UnitOutsideFleet { .. })));

  let mut bad = s.meta;
  bad.collection_date = Some(d(2025, 7, 9));
  let err = engine.commit(bad, &[unit(1)]).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::CollectionBeforeEvent { .. })));

  assert!(engine.events().is_empty());
}

#[tokio::test]
async fn commit_rejects_spans_beyond_the_limit() {
  let mut engine = engine_with(Vec::new(), MemoryStore::default(), 2).await;
  let meta = EventMeta {
    name:            "Forever".into(),
    venue:           "Bath".into(),
    location:        "BA2 6LP".into(),
    delivery_date:   d(1, 1, 1),
    event_date:      d(9999, 12, 31),
    collection_date: None,
  };

  let err = engine.commit(meta, &[unit(1), unit(2)]).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::WindowTooLong { .. })));
  assert!(engine.events().is_empty());
  assert_eq!(engine.index().booked_count(unit(1)), 0);

  let mut req = request("Bath", d(2025, 1, 1), 1);
  req.collection_date = Some(d(2026, 6, 1));
  let err = engine.suggest(&req).await.unwrap_err();
  assert!(matches!(err, Error::Core(ebar_core::Error::WindowTooLong { .. })));
}

#[tokio::test]
async fn overriding_with_a_booked_unit_is_allowed() {
  let records = vec![DeploymentRecord::new(unit(1), d(2025, 7, 10), "Depot")];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;
  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 1)).await.unwrap();

  let rows = engine.commit(s.meta, &[unit(1), unit(1)]).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].assigned_unit, unit(1));
}

#[tokio::test]
async fn persistence_failure_surfaces_and_leaves_state_untouched() {
  let mut engine = engine_with(Vec::new(), MemoryStore::failing(), 2).await;
  let s = engine.suggest(&request("Bath", d(2025, 7, 10), 1)).await.unwrap();

  let err = engine.commit(s.meta, &[unit(1)]).await.unwrap_err();
  assert!(matches!(err, Error::Persistence(_)));
  assert!(engine.events().is_empty());
  assert!(engine.index().is_available(unit(1), d(2025, 7, 10)));
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn views_reflect_committed_events() {
  let records = vec![DeploymentRecord::new(unit(2), d(2025, 7, 1), "Depot")];
  let mut engine = engine_with(records, MemoryStore::default(), 2).await;
  let s = engine.suggest(&request("LFC", d(2025, 7, 10), 1)).await.unwrap();
  engine.commit(s.meta, &[unit(1)]).await.unwrap();

  let months = engine.calendar(None);
  assert_eq!(months.len(), 1);
  assert_eq!(months[0].days[0].count, 1);

  let grid = engine.schedule_grid(&DateWindow::single(d(2025, 7, 10)));
  assert_eq!(grid.rows[0].cells, vec!["LFC"]);
  assert_eq!(grid.rows[1].cells, vec![""]);

  let overview = engine.unit_overview();
  assert_eq!(overview[0].current_location, None);
  assert_eq!(overview[0].booked_days, 1);
  assert_eq!(overview[1].current_location.as_deref(), Some("Depot"));

  let geojson = engine.map_geojson().await;
  assert_eq!(geojson["features"][0]["properties"]["venue"], "LFC");
}
