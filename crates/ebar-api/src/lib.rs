//! JSON REST API for the EBar scheduler.
//!
//! Exposes an axum [`Router`] over a shared [`SchedulingEngine`]. The engine
//! sits behind one async mutex, so requests that touch it are served one at a
//! time. Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", ebar_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod events;
pub mod units;
pub mod views;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use ebar_core::{geo::Geocoder, store::EventStore};
use ebar_engine::SchedulingEngine;
use tokio::sync::Mutex;

pub use error::ApiError;

/// The engine as shared between handlers.
pub type SharedEngine<S, G> = Arc<Mutex<SchedulingEngine<S, G>>>;

/// Wrap an engine for [`api_router`].
pub fn share<S, G>(engine: SchedulingEngine<S, G>) -> SharedEngine<S, G> {
  Arc::new(Mutex::new(engine))
}

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(engine: SharedEngine<S, G>) -> Router<()>
where
  S: EventStore + 'static,
  G: Geocoder + 'static,
{
  Router::new()
    // Fleet and registry
    .route("/units", get(units::list::<S, G>))
    .route("/venues", get(units::venues::<S, G>))
    // Events
    .route("/events", get(events::list::<S, G>).post(events::commit::<S, G>))
    .route("/suggestions", post(events::suggest::<S, G>))
    .route("/refresh", post(events::refresh::<S, G>))
    // Views
    .route("/calendar", get(views::calendar::<S, G>))
    .route("/schedule", get(views::schedule::<S, G>))
    .route("/map", get(views::map::<S, G>))
    .with_state(engine)
}
