//! Error types for `memoir-core`, plus the classification trait the API
//! layer uses to map backend errors onto HTTP statuses.

use thiserror::Error;
use uuid::Uuid;

use crate::comment::MAX_COMMENT_LEN;

#[derive(Debug, Error)]
pub enum Error {
  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("no person with slug {0:?}")]
  SlugNotFound(String),

  #[error("life event not found: {0}")]
  LifeEventNotFound(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("comment target {kind} {id} does not exist")]
  TargetNotFound { kind: &'static str, id: Uuid },

  #[error("reply is only allowed up to {max} levels")]
  ReplyTooDeep { max: usize },

  #[error("comment body is empty")]
  EmptyCommentBody,

  #[error("comment body is {len} characters; the maximum is {MAX_COMMENT_LEN}")]
  CommentTooLong { len: usize },

  #[error("cannot derive a slug from name {0:?}")]
  UnsluggableName(String),

  #[error("malformed import record: {0}")]
  MalformedImport(String),

  #[error("unknown comment target kind: {0:?}")]
  UnknownTargetKind(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Classification ──────────────────────────────────────────────────────────

/// Coarse error category, mirroring the failure taxonomy of the service:
/// invalid input, missing entity, uniqueness conflict, unparseable import,
/// or an internal fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  NotFound,
  Invalid,
  Conflict,
  MalformedInput,
  Internal,
}

/// Implemented by every store backend's error type so generic callers can
/// classify a failure without knowing the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> ErrorKind;
}

impl StoreError for Error {
  fn kind(&self) -> ErrorKind {
    match self {
      Self::PersonNotFound(_)
      | Self::SlugNotFound(_)
      | Self::LifeEventNotFound(_)
      | Self::CommentNotFound(_)
      | Self::TargetNotFound { .. } => ErrorKind::NotFound,
      Self::ReplyTooDeep { .. }
      | Self::EmptyCommentBody
      | Self::CommentTooLong { .. }
      | Self::UnsluggableName(_) => ErrorKind::Invalid,
      Self::MalformedImport(_) => ErrorKind::MalformedInput,
      Self::UnknownTargetKind(_) | Self::Serialization(_) => ErrorKind::Internal,
    }
  }
}
