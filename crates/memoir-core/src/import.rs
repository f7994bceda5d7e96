//! Bulk import — the JSON record format used to load a person and their
//! life events in one atomic write.
//!
//! The format has no version field; unknown keys are ignored. A record
//! without a name is malformed. Individual life events missing any field, or
//! carrying an unparseable date, are skipped with a warning rather than
//! failing the batch.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, person::NewLifeEvent};

// ─── Record types ────────────────────────────────────────────────────────────

/// One life event as it appears in the import file. Every field is optional
/// at parse time so an incomplete event degrades to a per-event skip instead
/// of a parse failure for the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportEvent {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub event_date:  Option<String>,
}

impl ImportEvent {
  /// The validated event, or `None` if any field is missing or the date does
  /// not parse as `YYYY-MM-DD`.
  pub fn complete(&self) -> Option<NewLifeEvent> {
    let title = self.title.as_deref().filter(|t| !t.is_empty())?;
    let description = self.description.as_deref().filter(|d| !d.is_empty())?;
    let date_str = self.event_date.as_deref()?;
    let event_date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
    Some(NewLifeEvent {
      title: title.to_owned(),
      description: description.to_owned(),
      event_date,
    })
  }

  /// Label used in skip warnings.
  pub fn label(&self) -> &str {
    self.title.as_deref().unwrap_or("(untitled)")
  }
}

/// The top-level import record.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRecord {
  pub name:        String,
  #[serde(default)]
  pub biography:   String,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  #[serde(default)]
  pub occupation:  Vec<String>,
  pub nationality: Option<String>,
  #[serde(default)]
  pub life_events: Vec<ImportEvent>,
}

impl ImportRecord {
  /// Parse an import record from raw JSON. Parse failures — including a
  /// missing or empty name — are malformed input, not internal errors.
  pub fn from_json(json: &str) -> Result<Self> {
    let record: Self =
      serde_json::from_str(json).map_err(|e| Error::MalformedImport(e.to_string()))?;
    if record.name.is_empty() {
      return Err(Error::MalformedImport("record has no name".into()));
    }
    Ok(record)
  }
}

// ─── Mode and outcome ────────────────────────────────────────────────────────

/// How an import treats an existing person with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
  /// Get-or-create by name; an existing person's fields are left untouched
  /// and the record's events are appended.
  Create,
  /// Update-or-create by name; all existing life events are deleted and
  /// recreated from the record.
  Update,
}

/// Summary of one completed import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
  pub person_id:      Uuid,
  /// `true` if the person row was created by this import.
  pub created:        bool,
  pub events_created: usize,
  /// Labels of life events skipped as incomplete.
  pub skipped:        Vec<String>,
}
