//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexicographic comparison in SQL equals
//! chronological comparison. Calendar dates are ISO `YYYY-MM-DD`. UUIDs are
//! hyphenated lowercase strings. Booleans are SQLite integers.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use memoir_core::{
  comment::{Comment, CommentTarget},
  person::{Evidence, EvidenceBody, LifeEvent, Person},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Occupation list ─────────────────────────────────────────────────────────

/// Ordered role strings become a comma-delimited column; an empty list is
/// stored as NULL.
pub fn encode_occupation(roles: &[String]) -> Option<String> {
  if roles.is_empty() {
    None
  } else {
    Some(roles.join(","))
  }
}

pub fn decode_occupation(s: Option<&str>) -> Vec<String> {
  match s {
    Some(joined) if !joined.is_empty() => {
      joined.split(',').map(str::to_owned).collect()
    }
    _ => Vec::new(),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawPerson::from_row`]; keep the two in sync.
pub const PERSON_COLUMNS: &str = "person_id, name, slug, image, biography, \
   birth_date, death_date, occupation, nationality, created_at";

/// [`PERSON_COLUMNS`] qualified with the `p` alias, for joined selects where
/// bare column names would be ambiguous.
pub const PERSON_COLUMNS_P: &str = "p.person_id, p.name, p.slug, p.image, \
   p.biography, p.birth_date, p.death_date, p.occupation, p.nationality, \
   p.created_at";

/// Raw strings read directly from a `people` row.
pub struct RawPerson {
  pub person_id:   String,
  pub name:        String,
  pub slug:        String,
  pub image:       Option<String>,
  pub biography:   String,
  pub birth_date:  Option<String>,
  pub death_date:  Option<String>,
  pub occupation:  Option<String>,
  pub nationality: Option<String>,
  pub created_at:  String,
}

impl RawPerson {
  /// Read from a row selected with [`PERSON_COLUMNS`] starting at index
  /// `base` (non-zero when person columns trail other select items).
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      person_id:   row.get(base)?,
      name:        row.get(base + 1)?,
      slug:        row.get(base + 2)?,
      image:       row.get(base + 3)?,
      biography:   row.get(base + 4)?,
      birth_date:  row.get(base + 5)?,
      death_date:  row.get(base + 6)?,
      occupation:  row.get(base + 7)?,
      nationality: row.get(base + 8)?,
      created_at:  row.get(base + 9)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      person_id:   decode_uuid(&self.person_id)?,
      name:        self.name,
      slug:        self.slug,
      image:       self.image,
      biography:   self.biography,
      birth_date:  self.birth_date.as_deref().map(decode_date).transpose()?,
      death_date:  self.death_date.as_deref().map(decode_date).transpose()?,
      occupation:  decode_occupation(self.occupation.as_deref()),
      nationality: self.nationality,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `life_events` row.
pub struct RawLifeEvent {
  pub event_id:    String,
  pub person_id:   String,
  pub title:       String,
  pub description: String,
  pub event_date:  String,
}

impl RawLifeEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:    row.get(0)?,
      person_id:   row.get(1)?,
      title:       row.get(2)?,
      description: row.get(3)?,
      event_date:  row.get(4)?,
    })
  }

  pub fn into_life_event(self) -> Result<LifeEvent> {
    Ok(LifeEvent {
      event_id:    decode_uuid(&self.event_id)?,
      person_id:   decode_uuid(&self.person_id)?,
      title:       self.title,
      description: self.description,
      event_date:  decode_date(&self.event_date)?,
    })
  }
}

/// Raw strings read directly from an `evidence` row.
pub struct RawEvidence {
  pub evidence_id:  String,
  pub event_id:     String,
  pub kind:         String,
  pub content_json: String,
  pub created_at:   String,
}

impl RawEvidence {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      evidence_id:  row.get(0)?,
      event_id:     row.get(1)?,
      kind:         row.get(2)?,
      content_json: row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_evidence(self) -> Result<Evidence> {
    let content: serde_json::Value = serde_json::from_str(&self.content_json)?;
    let body = EvidenceBody::from_parts(&self.kind, content).map_err(Error::Core)?;
    Ok(Evidence {
      evidence_id: decode_uuid(&self.evidence_id)?,
      event_id:    decode_uuid(&self.event_id)?,
      body,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawComment::from_row`]; keep the two in sync.
pub const COMMENT_COLUMNS: &str = "comment_id, target_kind, target_id, \
   user_name, body, created_at, is_public, is_removed, parent_id";

/// Raw strings read directly from a `comments` row.
pub struct RawComment {
  pub comment_id:  String,
  pub target_kind: String,
  pub target_id:   String,
  pub user_name:   Option<String>,
  pub body:        String,
  pub created_at:  String,
  pub is_public:   bool,
  pub is_removed:  bool,
  pub parent_id:   Option<String>,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id:  row.get(0)?,
      target_kind: row.get(1)?,
      target_id:   row.get(2)?,
      user_name:   row.get(3)?,
      body:        row.get(4)?,
      created_at:  row.get(5)?,
      is_public:   row.get(6)?,
      is_removed:  row.get(7)?,
      parent_id:   row.get(8)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    let target_id = decode_uuid(&self.target_id)?;
    let target =
      CommentTarget::from_parts(&self.target_kind, target_id).map_err(Error::Core)?;
    Ok(Comment {
      comment_id: decode_uuid(&self.comment_id)?,
      target,
      user_name:  self.user_name,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
      is_public:  self.is_public,
      is_removed: self.is_removed,
      parent:     self.parent_id.as_deref().map(decode_uuid).transpose()?,
    })
  }
}
