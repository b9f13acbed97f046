//! Flat-file backend for the EBar event store.
//!
//! The whole table lives in one CSV file with the columns listed in
//! [`encode::COLUMNS`]. Every commit rewrites the file: rows go to a
//! temporary file in the same directory which is then renamed over the
//! original, so a crash mid-write never leaves a truncated table behind.
//!
//! Not safe for concurrent writers. Use `ebar-store-sqlite` for that.

pub mod encode;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::CsvStore;
