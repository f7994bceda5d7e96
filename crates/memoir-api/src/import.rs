//! Handler for `POST /import` — multipart upload of a bulk-import JSON file.
//!
//! The upload is spooled to a transient file which is removed on every exit
//! path, success or failure, via a drop guard.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Json,
  extract::{Multipart, Query, State},
};
use memoir_core::{
  import::{ImportMode, ImportOutcome, ImportRecord},
  store::BioStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Spool guard ──────────────────────────────────────────────────────────────

/// A transient on-disk copy of the uploaded file. Deleting in `Drop` covers
/// every exit path, including early returns on parse failure.
struct SpoolFile {
  path: PathBuf,
}

impl SpoolFile {
  async fn create(data: &[u8]) -> std::io::Result<Self> {
    let path =
      std::env::temp_dir().join(format!("memoir-import-{}.json", Uuid::new_v4()));
    tokio::fs::write(&path, data).await?;
    Ok(Self { path })
  }

  fn path(&self) -> &Path { &self.path }
}

impl Drop for SpoolFile {
  fn drop(&mut self) {
    let _ = std::fs::remove_file(&self.path);
  }
}

// ─── Handler ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  /// If `true`, run in update mode: existing person updated by name and
  /// their life events replaced wholesale.
  #[serde(default)]
  pub update: bool,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
  pub message: &'static str,
  pub outcome: ImportOutcome,
}

/// `POST /import[?update=true]` — multipart form with a single `file` part.
///
/// Only `.json` files are accepted; a missing part or wrong extension is a
/// 400 with the user-visible message.
pub async fn upload<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<UploadParams>,
  mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError>
where
  S: BioStore,
{
  let mut file: Option<(String, axum::body::Bytes)> = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    if field.name() == Some("file") {
      let filename = field.file_name().unwrap_or_default().to_owned();
      let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
      file = Some((filename, data));
      break;
    }
  }

  let (filename, data) = file.ok_or_else(|| ApiError::BadRequest("No file part".into()))?;
  if !filename.to_lowercase().ends_with(".json") {
    return Err(ApiError::BadRequest(
      "Invalid file type. Please upload a .json file.".into(),
    ));
  }

  let spool = SpoolFile::create(&data)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let json = tokio::fs::read_to_string(spool.path())
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let record = ImportRecord::from_json(&json).map_err(ApiError::from_store)?;
  let mode = if params.update { ImportMode::Update } else { ImportMode::Create };

  let outcome = store
    .import_person(record, mode)
    .await
    .map_err(ApiError::from_store)?;

  for label in &outcome.skipped {
    tracing::warn!(event = %label, "skipping incomplete life event");
  }
  tracing::info!(
    person_id = %outcome.person_id,
    created = outcome.created,
    events = outcome.events_created,
    "import finished"
  );

  Ok(Json(UploadResponse { message: "File processed successfully!", outcome }))
}
