//! JSON REST API for Memoir.
//!
//! Exposes an axum [`Router`] backed by any [`memoir_core::store::BioStore`].
//! HTML rendering, auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", memoir_api::api_router(store.clone()))
//! ```

pub mod comments;
pub mod error;
pub mod evidence;
pub mod import;
pub mod people;
pub mod search;
pub mod trending;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use memoir_core::store::BioStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: BioStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{slug}",
      get(people::detail::<S>).delete(people::delete::<S>),
    )
    .route("/people/{slug}/events", post(people::add_event::<S>))
    // Evidence
    .route(
      "/events/{id}/evidence",
      get(evidence::list::<S>).post(evidence::create::<S>),
    )
    // Search and trending
    .route("/search", get(search::handler::<S>))
    .route("/trending", get(trending::handler::<S>))
    // Comments
    .route("/comments", get(comments::list::<S>).post(comments::create::<S>))
    .route("/comments/{id}/moderate", post(comments::moderate::<S>))
    // Bulk import
    .route("/import", post(import::upload::<S>))
    .with_state(store)
}
