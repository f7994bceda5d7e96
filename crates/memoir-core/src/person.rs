//! Person — the biographical profile entity — and its attached life events
//! and evidence.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

// ─── Person ──────────────────────────────────────────────────────────────────

/// A biographical profile. The slug is globally unique, non-empty, and
/// write-once: it is derived from the name at creation and never re-derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:   Uuid,
  pub name:        String,
  pub slug:        String,
  /// Path to a stored image; no binary data lives in the database.
  pub image:       Option<String>,
  pub biography:   String,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  /// Ordered role strings; persisted as a comma-delimited string.
  pub occupation:  Vec<String>,
  pub nationality: Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::BioStore::add_person`].
/// `person_id`, `created_at`, and (unless `slug` is given) the slug are all
/// assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewPerson {
  pub name:        String,
  /// Explicit slug base. When absent the slug is derived from `name`.
  pub slug:        Option<String>,
  pub image:       Option<String>,
  pub biography:   String,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  pub occupation:  Vec<String>,
  pub nationality: Option<String>,
}

impl NewPerson {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }
}

// ─── LifeEvent ───────────────────────────────────────────────────────────────

/// A dated milestone in a person's life. Deleted en masse when the person's
/// data is refreshed through a bulk re-import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeEvent {
  pub event_id:    Uuid,
  pub person_id:   Uuid,
  pub title:       String,
  pub description: String,
  pub event_date:  NaiveDate,
}

/// Input to [`crate::store::BioStore::add_life_event`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLifeEvent {
  pub title:       String,
  pub description: String,
  pub event_date:  NaiveDate,
}

// ─── Evidence ────────────────────────────────────────────────────────────────

/// The typed payload of an evidence record. The variant name serves as the
/// `kind` discriminant stored in the database, and the variant itself
/// guarantees exactly one content field is populated per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "content", rename_all = "snake_case")]
pub enum EvidenceBody {
  Text(String),
  Link(String),
  /// Path to a stored image file.
  Image(String),
  /// Path to a stored video file.
  Video(String),
}

impl EvidenceBody {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Text(_) => "text",
      Self::Link(_) => "link",
      Self::Image(_) => "image",
      Self::Video(_) => "video",
    }
  }

  /// Serialise the inner content (without the kind tag) for the `content_json`
  /// database column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("content").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Deserialise from the discriminant string and JSON content stored in the
  /// database.
  pub fn from_parts(discriminant: &str, content: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "kind": discriminant, "content": content });
    Ok(serde_json::from_value(wrapped)?)
  }
}

/// An evidentiary attachment supporting a life event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
  pub evidence_id: Uuid,
  pub event_id:    Uuid,
  pub body:        EvidenceBody,
  pub created_at:  DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evidence_body_discriminants_roundtrip() {
    for body in [
      EvidenceBody::Text("born in 1990".into()),
      EvidenceBody::Link("https://example.com".into()),
      EvidenceBody::Image("evidence/a.jpg".into()),
      EvidenceBody::Video("evidence/b.mp4".into()),
    ] {
      let json = body.to_json().unwrap();
      let back = EvidenceBody::from_parts(body.discriminant(), json).unwrap();
      assert_eq!(back, body);
    }
  }
}
