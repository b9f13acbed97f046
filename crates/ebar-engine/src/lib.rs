//! Availability-and-assignment engine for the EBar fleet.
//!
//! Control flow for one scheduling request:
//!
//! 1. [`history`] turns the planning grid into deployment records.
//! 2. [`availability::AvailabilityIndex`] folds records and committed events
//!    into per-unit booked dates and current locations.
//! 3. [`ranker::Ranker`] filters units through the index and
//!    [`conflict::ConflictDetector`], then orders them by distance.
//! 4. Confirmed assignments go through [`engine::SchedulingEngine::commit`],
//!    which persists them and folds them back into the index.

pub mod availability;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod geocache;
pub mod history;
pub mod ranker;
pub mod views;

pub use engine::{SchedulingEngine, Suggestion, SuggestionRequest};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
