//! Core types and trait definitions for the EBar scheduling engine.
//!
//! This crate is deliberately free of HTTP and file-format dependencies.
//! Storage backends implement [`store::EventStore`]; geocoding adapters
//! implement [`geo::Geocoder`]. Everything else depends on these seams.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod deployment;
pub mod error;
pub mod event;
pub mod geo;
pub mod store;
pub mod unit;
pub mod venue;

pub use error::{Error, Result};
