//! Deployment history loader.
//!
//! The planning sheet is a grid: one header row maps column positions to
//! dates, one column maps row positions to unit numbers, and every other cell
//! holds the location of that unit on that date. It is read either straight
//! from the workbook or from a CSV export of it.
//!
//! Malformed input never fails the load. Headers that are not dates drop their
//! column, rows without a numeric unit id are skipped whole, and blank cells
//! become records with an empty location.

use std::{
  collections::{BTreeMap, HashMap},
  fs::File,
  io::Read,
  path::Path,
};

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use ebar_core::{deployment::DeploymentRecord, unit::UnitId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;

/// Date formats accepted in header cells, tried in order.
const HEADER_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// Timestamp formats accepted in header cells; only the date part is kept.
const HEADER_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ─── Cells ───────────────────────────────────────────────────────────────────

/// One grid cell as delivered by whatever read the planning sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
  #[default]
  Empty,
  Text(String),
  Number(f64),
  Date(NaiveDate),
}

impl Cell {
  /// Wrap a raw text value, mapping blank strings to [`Cell::Empty`].
  pub fn text(raw: &str) -> Self {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      Cell::Empty
    } else {
      Cell::Text(trimmed.to_owned())
    }
  }

  /// Interpret the cell as a header date.
  pub fn as_date(&self) -> Option<NaiveDate> {
    match self {
      Cell::Date(d) => Some(*d),
      Cell::Text(s) => parse_date(s),
      Cell::Empty | Cell::Number(_) => None,
    }
  }

  /// Interpret the cell as a unit number (`7`, `7.0`, `"007"`, `"EBAR007"`).
  pub fn as_unit(&self) -> Option<UnitId> {
    match self {
      Cell::Number(n) => UnitId::from_cell_number(*n),
      Cell::Text(s) => s
        .parse::<UnitId>()
        .ok()
        .or_else(|| s.trim().parse::<f64>().ok().and_then(UnitId::from_cell_number)),
      Cell::Empty | Cell::Date(_) => None,
    }
  }

  /// Render the cell as a location label; blank cells give `""`.
  pub fn as_location(&self) -> String {
    match self {
      Cell::Empty => String::new(),
      Cell::Text(s) => s.trim().to_owned(),
      Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
      Cell::Number(n) => n.to_string(),
      Cell::Date(d) => d.to_string(),
    }
  }
}

impl From<&Data> for Cell {
  fn from(data: &Data) -> Self {
    match data {
      Data::String(s) | Data::DateTimeIso(s) => Cell::text(s),
      Data::Float(f) => Cell::Number(*f),
      Data::Int(i) => Cell::Number(*i as f64),
      Data::Bool(b) => Cell::Text(b.to_string()),
      Data::DateTime(dt) => dt.as_datetime().map_or(Cell::Empty, |t| Cell::Date(t.date())),
      _ => Cell::Empty,
    }
  }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
  let s = raw.trim();
  HEADER_DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    .or_else(|| {
      HEADER_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
    })
}

// ─── Grid ────────────────────────────────────────────────────────────────────

/// Where the interesting parts of the planning sheet live. All indices are
/// zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
  pub header_row:        usize,
  pub unit_column:       usize,
  pub first_data_row:    usize,
  pub first_data_column: usize,
}

impl Default for GridLayout {
  /// The 2025 planning sheet: dates on row 3, unit numbers in column B, data
  /// from row 4 and column C.
  fn default() -> Self {
    Self {
      header_row:        2,
      unit_column:       1,
      first_data_row:    3,
      first_data_column: 2,
    }
  }
}

/// A rectangular-ish grid of cells; rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentGrid {
  rows: Vec<Vec<Cell>>,
}

impl DeploymentGrid {
  pub fn new(rows: Vec<Vec<Cell>>) -> Self { Self { rows } }

  pub fn rows(&self) -> &[Vec<Cell>] { &self.rows }

  /// Read a CSV export of the planning sheet. Every line is data; the layout
  /// decides which row holds the dates.
  pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new()
      .has_headers(false)
      .flexible(true)
      .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.records() {
      let record = record?;
      rows.push(record.iter().map(Cell::text).collect());
    }
    Ok(Self { rows })
  }

  pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    info!("Loading deployment plan from {:?}", path);
    let file = File::open(path)?;
    Self::from_csv_reader(file)
  }

  /// Read one sheet of the planning workbook (xlsx, xls or ods).
  pub fn from_xlsx_path(path: impl AsRef<Path>, sheet: &str) -> Result<Self> {
    let path = path.as_ref();
    info!("Loading deployment plan from {:?}, sheet {:?}", path, sheet);
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range(sheet)?;
    Ok(Self::from_range(&range))
  }

  /// Convert a worksheet range. The range starts at its first used cell, so
  /// it is padded back out to sheet coordinates for [`GridLayout`].
  pub fn from_range(range: &Range<Data>) -> Self {
    let (top, left) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); top as usize];
    for row in range.rows() {
      let mut cells = vec![Cell::Empty; left as usize];
      cells.extend(row.iter().map(Cell::from));
      rows.push(cells);
    }
    Self { rows }
  }
}

/// Whether `path` names a spreadsheet workbook rather than a CSV export.
pub fn is_workbook(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "xlsx" | "xlsm" | "xls" | "ods"))
}

// ─── Loader ──────────────────────────────────────────────────────────────────

/// What the loader kept and what it dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub dated_columns:   usize,
  pub skipped_headers: usize,
  pub skipped_rows:    usize,
  /// Cells that replaced an earlier cell for the same unit and date.
  pub duplicates:      usize,
  pub records:         usize,
}

/// Turn a grid into deployment records.
///
/// Records come out in reading order (row by row, left to right). When the
/// grid names the same unit and date twice, the later cell wins but the
/// record keeps the position of the first one.
pub fn load_records(
  grid: &DeploymentGrid,
  layout: &GridLayout,
) -> (Vec<DeploymentRecord>, LoadReport) {
  let mut report = LoadReport::default();

  let header = grid.rows.get(layout.header_row).map(Vec::as_slice).unwrap_or(&[]);
  let mut date_map: BTreeMap<usize, NaiveDate> = BTreeMap::new();
  for (col, cell) in header.iter().enumerate().skip(layout.first_data_column) {
    match cell.as_date() {
      Some(date) => {
        date_map.insert(col, date);
      }
      None => report.skipped_headers += 1,
    }
  }
  report.dated_columns = date_map.len();

  let mut records: Vec<DeploymentRecord> = Vec::new();
  let mut seen: HashMap<(UnitId, NaiveDate), usize> = HashMap::new();

  for row in grid.rows.iter().skip(layout.first_data_row) {
    let unit = match row.get(layout.unit_column).and_then(Cell::as_unit) {
      Some(u) => u,
      None => {
        report.skipped_rows += 1;
        continue;
      }
    };

    for (&col, &date) in &date_map {
      let location = row.get(col).map(Cell::as_location).unwrap_or_default();
      match seen.get(&(unit, date)) {
        Some(&idx) => {
          records[idx].location = location;
          report.duplicates += 1;
        }
        None => {
          seen.insert((unit, date), records.len());
          records.push(DeploymentRecord::new(unit, date, location));
        }
      }
    }
  }

  report.records = records.len();
  debug!(?report, "deployment grid parsed");
  info!(
    "Loaded {} deployment records ({} dated columns, {} rows skipped)",
    report.records, report.dated_columns, report.skipped_rows
  );

  (records, report)
}
