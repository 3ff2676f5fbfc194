//! JSON admin API for the barangay resident registry.
//!
//! Exposes an axum [`Router`] over a [`SyncAdapter`], a
//! [`LocalObjectStore`] for uploads and any [`ReverseGeocoder`]. Auth, TLS
//! and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", barangay_api::api_router(state))
//! ```

pub mod error;
pub mod extract;
pub mod media;
pub mod residents;
pub mod statuses;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use barangay_core::{geo::ReverseGeocoder, store::ResidentStore, sync::SyncAdapter};
use barangay_media::LocalObjectStore;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S, G> {
  pub adapter:   Arc<SyncAdapter<S>>,
  pub media:     Arc<LocalObjectStore>,
  pub geocoder:  Arc<G>,
  /// Lifetime of the signed media URLs placed in resident details.
  pub media_ttl: Duration,
}

impl<S, G> Clone for ApiState<S, G> {
  fn clone(&self) -> Self {
    Self {
      adapter:   self.adapter.clone(),
      media:     self.media.clone(),
      geocoder:  self.geocoder.clone(),
      media_ttl: self.media_ttl,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, G>(state: ApiState<S, G>) -> Router<()>
where
  S: ResidentStore + 'static,
  G: ReverseGeocoder + 'static,
{
  Router::new()
    // Residents
    .route(
      "/residents",
      get(residents::list::<S, G>).post(residents::submit::<S, G>),
    )
    .route("/residents/summary", get(residents::summary::<S, G>))
    .route("/residents/reload", post(residents::reload::<S, G>))
    .route(
      "/residents/{id}",
      get(residents::detail::<S, G>).delete(residents::delete_one::<S, G>),
    )
    .route("/residents/{id}/approve", post(residents::approve::<S, G>))
    .route("/residents/{id}/reject", post(residents::reject::<S, G>))
    .route(
      "/residents/{id}/request-update",
      post(residents::request_update::<S, G>),
    )
    // Status registry
    .route("/statuses", get(statuses::list))
    // Media
    .route(
      "/media/{*path}",
      get(media::download::<S, G>).put(media::upload::<S, G>),
    )
    .with_state(state)
}
