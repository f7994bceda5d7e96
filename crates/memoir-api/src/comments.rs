//! Handlers for `/comments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/comments` | `?target_kind` + `?target_id` required |
//! | `POST` | `/comments` | Body: [`NewCommentBody`]; 422 on over-depth reply |
//! | `POST` | `/comments/:id/moderate` | Body: [`ModerateBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use memoir_core::{
  comment::{Comment, CommentTarget, NewComment},
  store::BioStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Body shown in place of a removed comment.
pub const REMOVED_BODY: &str = "This comment has been removed.";

// ─── View model ───────────────────────────────────────────────────────────────

/// The read model for a comment: author name resolved (never empty) and the
/// body of a removed comment replaced with [`REMOVED_BODY`].
#[derive(Debug, Serialize)]
pub struct CommentView {
  pub comment_id: Uuid,
  pub target:     CommentTarget,
  pub author:     String,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  pub is_public:  bool,
  pub is_removed: bool,
  pub parent:     Option<Uuid>,
}

impl From<Comment> for CommentView {
  fn from(c: Comment) -> Self {
    let author = c.author_name().to_owned();
    let body = if c.is_removed { REMOVED_BODY.to_owned() } else { c.body };
    Self {
      comment_id: c.comment_id,
      target: c.target,
      author,
      body,
      created_at: c.created_at,
      is_public: c.is_public,
      is_removed: c.is_removed,
      parent: c.parent,
    }
  }
}

fn parse_target(kind: &str, id: Uuid) -> Result<CommentTarget, ApiError> {
  CommentTarget::from_parts(kind, id)
    .map_err(|_| ApiError::BadRequest(format!("unknown target kind {kind:?}")))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub target_kind:    String,
  pub target_id:      Uuid,
  /// If `true`, also return non-public comments. Default `false`.
  #[serde(default)]
  pub include_hidden: bool,
}

/// `GET /comments?target_kind=<kind>&target_id=<id>[&include_hidden=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<CommentView>>, ApiError>
where
  S: BioStore,
{
  let target = parse_target(&params.target_kind, params.target_id)?;
  let thread = store
    .list_comments(target, params.include_hidden)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(thread.into_iter().map(CommentView::from).collect()))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments`.
#[derive(Debug, Deserialize)]
pub struct NewCommentBody {
  pub target_kind: String,
  pub target_id:   Uuid,
  pub user_name:   Option<String>,
  pub body:        String,
  /// Reply parent; omit for a root comment.
  pub parent:      Option<Uuid>,
}

/// `POST /comments` — returns 201 + the stored comment. Rejected with 422
/// when the reply would nest deeper than two levels, 404 when the target or
/// parent does not exist.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCommentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BioStore,
{
  let target = parse_target(&body.target_kind, body.target_id)?;
  let new = NewComment {
    target,
    user_name: body.user_name,
    body:      body.body,
    parent:    body.parent,
  };

  let comment = store.add_comment(new).await.map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(CommentView::from(comment))))
}

// ─── Moderate ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments/:id/moderate`. Omitted flags are
/// left unchanged; removal keeps the row and substitutes placeholder text on
/// read.
#[derive(Debug, Deserialize)]
pub struct ModerateBody {
  pub is_public:  Option<bool>,
  pub is_removed: Option<bool>,
}

/// `POST /comments/:id/moderate`
pub async fn moderate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<ModerateBody>,
) -> Result<Json<CommentView>, ApiError>
where
  S: BioStore,
{
  let comment = store
    .moderate_comment(id, body.is_public, body.is_removed)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(CommentView::from(comment)))
}
