//! HTTP server assembly for Memoir.
//!
//! Mounts the [`memoir_api`] router under `/api` and wraps it in request
//! tracing. Configuration comes from `config.toml` plus `MEMOIR_`-prefixed
//! environment variables.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use memoir_core::store::BioStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { "memoir.db".into() }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: the JSON API under `/api`, traced.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: BioStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", memoir_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_defaults_apply_to_empty_input() {
    let cfg: ServerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("memoir.db"));
  }
}
