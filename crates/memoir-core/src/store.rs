//! The `BioStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `memoir-store-sqlite`).
//! Higher layers (`memoir-api`, `memoir-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  comment::{Comment, CommentTarget, NewComment},
  error::StoreError,
  import::{ImportMode, ImportOutcome, ImportRecord},
  person::{Evidence, EvidenceBody, LifeEvent, NewLifeEvent, NewPerson, Person},
  trending::{TrendingEntry, TrendingPeriod},
};

/// Abstraction over a Memoir storage backend.
///
/// Uniqueness of person slugs is the backend's responsibility: the insert
/// path must treat a slug conflict as retryable and suffix the candidate
/// until the write is accepted, rather than pre-checking.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BioStore: Send + Sync {
  type Error: StoreError;

  // ── People ────────────────────────────────────────────────────────────

  /// Create and persist a person, assigning a unique slug from the name
  /// (or from the explicit slug base, if given).
  fn add_person(
    &self,
    new: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by slug. Returns `None` if not found.
  fn get_person_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + 'a;

  /// List all people, name ascending.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Delete a person; life events, evidence, and clicks cascade. Comments
  /// targeting the person are left behind as orphans. Returns `false` if the
  /// person did not exist.
  fn delete_person(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Case-insensitive substring search over name and biography.
  fn search_people<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  // ── Life events and evidence ──────────────────────────────────────────

  /// Attach a life event to a person.
  fn add_life_event(
    &self,
    person_id: Uuid,
    new: NewLifeEvent,
  ) -> impl Future<Output = Result<LifeEvent, Self::Error>> + Send + '_;

  /// All life events for a person, event date ascending.
  fn list_life_events(
    &self,
    person_id: Uuid,
  ) -> impl Future<Output = Result<Vec<LifeEvent>, Self::Error>> + Send + '_;

  /// Attach evidence to a life event.
  fn add_evidence(
    &self,
    event_id: Uuid,
    body: EvidenceBody,
  ) -> impl Future<Output = Result<Evidence, Self::Error>> + Send + '_;

  /// All evidence for a life event, creation order.
  fn list_evidence(
    &self,
    event_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Evidence>, Self::Error>> + Send + '_;

  // ── View tracking ─────────────────────────────────────────────────────

  /// Append one profile-view click. Clicks are never updated or read back
  /// individually; they exist only for [`BioStore::trending`].
  fn record_click(
    &self,
    person_id: Uuid,
    viewed_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// People ranked by click count inside the period's window ending at
  /// `now`, most-clicked first, ties broken by person id ascending. People
  /// with zero qualifying clicks are excluded.
  fn trending(
    &self,
    period: TrendingPeriod,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<TrendingEntry>, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  /// Create a comment. Fails if the body is invalid, the target does not
  /// resolve, the parent does not exist, or the reply depth would reach
  /// [`crate::comment::MAX_REPLY_DEPTH`].
  fn add_comment(
    &self,
    new: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Retrieve a comment by id. Returns `None` if not found.
  fn get_comment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + '_;

  /// The thread for a target, creation time ascending. Non-public comments
  /// are omitted unless `include_hidden`; removed comments are always
  /// included (display substitution is the caller's job).
  fn list_comments(
    &self,
    target: CommentTarget,
    include_hidden: bool,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + '_;

  /// Whether a comment target currently resolves to a live entity. Targets
  /// are not foreign keys, so this can become `false` after the fact.
  fn target_exists(
    &self,
    target: CommentTarget,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Update moderation flags. `None` leaves a flag unchanged. Removal never
  /// deletes the row — children may reference it as their parent.
  fn moderate_comment(
    &self,
    id: Uuid,
    is_public: Option<bool>,
    is_removed: Option<bool>,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  // ── Bulk import ───────────────────────────────────────────────────────

  /// Import a person and their life events in one atomic transaction.
  /// Incomplete events are skipped and reported in the outcome; an
  /// unexpected failure rolls back the entire write.
  fn import_person(
    &self,
    record: ImportRecord,
    mode: ImportMode,
  ) -> impl Future<Output = Result<ImportOutcome, Self::Error>> + Send + '_;
}
