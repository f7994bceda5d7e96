//! Handlers for `/events/:id/evidence` endpoints.
//!
//! The request and response bodies carry the tagged [`EvidenceBody`] form,
//! e.g. `{"kind": "link", "content": "https://example.com"}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use memoir_core::{
  person::{Evidence, EvidenceBody},
  store::BioStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /events/:id/evidence`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Evidence>>, ApiError>
where
  S: BioStore,
{
  let evidence = store.list_evidence(id).await.map_err(ApiError::from_store)?;
  Ok(Json(evidence))
}

/// `POST /events/:id/evidence` — returns 201 + the stored [`Evidence`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<EvidenceBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BioStore,
{
  let evidence = store
    .add_evidence(id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(evidence)))
}
