//! [`CsvStore`], the flat-file implementation of [`EventStore`].

use std::{
  fs::File,
  io::Write as _,
  path::{Path, PathBuf},
};

use ebar_core::{
  event::{Event, EventMeta},
  store::EventStore,
  unit::UnitId,
};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
  Result,
  encode::{COLUMNS, RawRow},
  error::Error,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An event store backed by one CSV file.
///
/// The rows are held in memory as well; they are replaced only after the
/// file on disk has been rewritten successfully.
pub struct CsvStore {
  path: PathBuf,
  rows: Mutex<Vec<Event>>,
}

impl CsvStore {
  /// Open the table at `path`, creating a header-only file if it is missing.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();

    let rows = {
      let path = path.clone();
      tokio::task::spawn_blocking(move || -> Result<Vec<Event>> {
        if !path.exists() {
          write_table(&path, &[])?;
          info!(path = %path.display(), "created empty event table");
        }
        read_table(&path)
      })
      .await??
    };

    info!(path = %path.display(), rows = rows.len(), "opened csv event store");
    Ok(Self { path, rows: Mutex::new(rows) })
  }

  pub fn path(&self) -> &Path { &self.path }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for CsvStore {
  type Error = Error;

  /// Re-read the file, so edits made outside this process are picked up.
  async fn load_events(&self) -> Result<Vec<Event>> {
    let mut rows = self.rows.lock().await;
    let path = self.path.clone();
    let fresh = tokio::task::spawn_blocking(move || read_table(&path)).await??;
    *rows = fresh.clone();
    Ok(fresh)
  }

  async fn commit(&self, meta: &EventMeta, units: &[UnitId]) -> Result<Vec<Event>> {
    let new: Vec<Event> = units
      .iter()
      .map(|unit| Event::new(meta.clone(), *unit))
      .collect();

    let mut rows = self.rows.lock().await;
    let mut table = rows.clone();
    table.extend(new.iter().cloned());

    let path = self.path.clone();
    let table = tokio::task::spawn_blocking(move || -> Result<Vec<Event>> {
      write_table(&path, &table)?;
      Ok(table)
    })
    .await??;

    debug!(path = %self.path.display(), rows = table.len(), "rewrote event table");
    *rows = table;
    Ok(new)
  }

  fn describe(&self) -> String { format!("csv:{}", self.path.display()) }
}

// ─── File I/O ────────────────────────────────────────────────────────────────

fn read_table(path: &Path) -> Result<Vec<Event>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::Headers)
    .from_path(path)?;

  reader
    .deserialize::<RawRow>()
    .map(|row| row?.into_event())
    .collect()
}

/// Write `rows` to a temporary file next to `path` and rename it into place.
fn write_table(path: &Path, rows: &[Event]) -> Result<()> {
  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
    _ => PathBuf::from("."),
  };
  std::fs::create_dir_all(&dir)?;

  let mut tmp = NamedTempFile::new_in(&dir)?;
  {
    let mut writer = csv::WriterBuilder::new()
      .has_headers(false)
      .from_writer(tmp.as_file_mut());
    writer.write_record(COLUMNS)?;
    for event in rows {
      writer.serialize(RawRow::from_event(event))?;
    }
    writer.flush()?;
  }
  tmp.as_file_mut().flush()?;
  tmp.as_file().sync_all()?;

  let file: File = tmp.persist(path)?;
  file.sync_all()?;
  Ok(())
}
