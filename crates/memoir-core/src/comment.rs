//! Comments — a threaded, moderated comment attached to any commentable
//! entity through a closed, typed target union.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum comment body length in characters.
pub const MAX_COMMENT_LEN: usize = 3000;

/// Maximum reply depth: root (0), reply (1), reply-to-reply (2).
/// A comment whose depth would reach this value is rejected.
pub const MAX_REPLY_DEPTH: usize = 3;

/// Author name shown when a comment was posted without one.
pub const ANONYMOUS: &str = "Anonymous";

// ─── Target ──────────────────────────────────────────────────────────────────

/// The entity a comment is attached to.
///
/// Stored as a `(target_kind, target_id)` pair with no foreign key, so
/// comments survive the deletion of their target and become orphaned rather
/// than cascading away. The closed set of variants replaces an open-ended
/// runtime type lookup with compile-time exhaustiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
  Person(Uuid),
  LifeEvent(Uuid),
}

impl CommentTarget {
  /// The discriminant string stored in the `target_kind` column.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Person(_) => "person",
      Self::LifeEvent(_) => "life_event",
    }
  }

  pub fn id(&self) -> Uuid {
    match self {
      Self::Person(id) | Self::LifeEvent(id) => *id,
    }
  }

  pub fn from_parts(discriminant: &str, id: Uuid) -> Result<Self> {
    match discriminant {
      "person" => Ok(Self::Person(id)),
      "life_event" => Ok(Self::LifeEvent(id)),
      other => Err(Error::UnknownTargetKind(other.to_owned())),
    }
  }
}

// ─── Comment ─────────────────────────────────────────────────────────────────

/// A stored comment. Removed comments are never hard-deleted — children may
/// still reference them through `parent` — and are shown with placeholder
/// content instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub comment_id: Uuid,
  pub target:     CommentTarget,
  /// Stored verbatim; the displayed author name is computed, not persisted.
  pub user_name:  Option<String>,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  pub is_public:  bool,
  pub is_removed: bool,
  /// `None` for a root comment.
  pub parent:     Option<Uuid>,
}

impl Comment {
  /// The displayed author name: the stored name, or [`ANONYMOUS`].
  pub fn author_name(&self) -> &str {
    match self.user_name.as_deref() {
      Some(name) if !name.is_empty() => name,
      _ => ANONYMOUS,
    }
  }
}

/// Input to [`crate::store::BioStore::add_comment`].
#[derive(Debug, Clone)]
pub struct NewComment {
  pub target:    CommentTarget,
  pub user_name: Option<String>,
  pub body:      String,
  pub parent:    Option<Uuid>,
}

impl NewComment {
  pub fn new(target: CommentTarget, body: impl Into<String>) -> Self {
    Self { target, user_name: None, body: body.into(), parent: None }
  }

  /// Validate the body before any store work happens.
  pub fn validate(&self) -> Result<()> {
    if self.body.trim().is_empty() {
      return Err(Error::EmptyCommentBody);
    }
    let len = self.body.chars().count();
    if len > MAX_COMMENT_LEN {
      return Err(Error::CommentTooLong { len });
    }
    Ok(())
  }
}
