//! [`SqliteStore`], the SQLite implementation of [`EventStore`].

use std::path::{Path, PathBuf};

use ebar_core::{
  event::{Event, EventMeta},
  store::EventStore,
  unit::UnitId,
};
use tracing::info;

use crate::{Result, encode::RawEvent, error::Error, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
  path: Option<PathBuf>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let conn = tokio_rusqlite::Connection::open(&path).await?;
    let store = Self { conn, path: Some(path) };
    store.init_schema().await?;
    info!(store = %store.describe(), "opened sqlite event store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, path: None };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn load_events(&self) -> Result<Vec<Event>> {
    let raws: Vec<RawEvent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, event_name, venue, location,
                  delivery_date, event_date, collection_date, assigned_ebar
           FROM events
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawEvent {
              event_id:        row.get(0)?,
              event_name:      row.get(1)?,
              venue:           row.get(2)?,
              location:        row.get(3)?,
              delivery_date:   row.get(4)?,
              event_date:      row.get(5)?,
              collection_date: row.get(6)?,
              assigned_ebar:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn commit(&self, meta: &EventMeta, units: &[UnitId]) -> Result<Vec<Event>> {
    let events: Vec<Event> = units
      .iter()
      .map(|unit| Event::new(meta.clone(), *unit))
      .collect();
    let raws: Vec<RawEvent> = events.iter().map(RawEvent::from_event).collect();

    // All rows land in one transaction or none do.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO events (
               event_id, event_name, venue, location,
               delivery_date, event_date, collection_date, assigned_ebar
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          )?;
          for raw in &raws {
            stmt.execute(rusqlite::params![
              raw.event_id,
              raw.event_name,
              raw.venue,
              raw.location,
              raw.delivery_date,
              raw.event_date,
              raw.collection_date,
              raw.assigned_ebar,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(events)
  }

  fn describe(&self) -> String {
    match &self.path {
      Some(path) => format!("sqlite:{}", path.display()),
      None => "sqlite::memory:".to_owned(),
    }
  }
}
