//! Handler for `GET /trending`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::Utc;
use memoir_core::{
  store::BioStore,
  trending::{TrendingEntry, TrendingPeriod},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
  /// `day` | `week` | `month` | `all`; anything else is a 400.
  pub period: Option<TrendingPeriod>,
}

/// `GET /trending[?period=<period>]` — defaults to `day`.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<TrendingEntry>>, ApiError>
where
  S: BioStore,
{
  let period = params.period.unwrap_or(TrendingPeriod::Day);
  let ranked = store
    .trending(period, Utc::now())
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(ranked))
}
