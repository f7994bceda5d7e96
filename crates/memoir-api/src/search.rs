//! Handler for `GET /search`.
//!
//! Free-text query matched as a case-insensitive substring against person
//! names and biographies.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use memoir_core::{person::Person, store::BioStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub q: String,
}

/// `GET /search?q=<text>`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Person>>, ApiError>
where
  S: BioStore,
{
  let people = store
    .search_people(&params.q)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(people))
}
