//! [`SqliteStore`] — the SQLite implementation of [`BioStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use memoir_core::{
  comment::{Comment, CommentTarget, MAX_REPLY_DEPTH, NewComment},
  import::{ImportMode, ImportOutcome, ImportRecord},
  person::{Evidence, EvidenceBody, LifeEvent, NewLifeEvent, NewPerson, Person},
  slug,
  store::BioStore,
  trending::{TrendingEntry, TrendingPeriod},
};

use crate::{
  Error, Result,
  encode::{
    COMMENT_COLUMNS, PERSON_COLUMNS, PERSON_COLUMNS_P, RawComment, RawEvidence,
    RawLifeEvent, RawPerson, decode_uuid, encode_date, encode_dt, encode_occupation,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Memoir biography store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run arbitrary DDL against the live connection, for tests that need to
  /// sabotage a table (e.g. an aborting trigger).
  #[cfg(test)]
  pub(crate) async fn execute_batch_raw(&self, sql: &str) -> Result<()> {
    let sql = sql.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Depth of an existing comment: edges walked from it to its root.
  /// Returns `None` if the comment does not exist. The walk stops once the
  /// depth exceeds anything [`MAX_REPLY_DEPTH`] cares about.
  async fn comment_depth(&self, id: Uuid) -> Result<Option<usize>> {
    let id_str = encode_uuid(id);

    let depth = self
      .conn
      .call(move |conn| {
        let mut current = id_str;
        let mut depth = 0usize;
        loop {
          let parent: Option<Option<String>> = conn
            .query_row(
              "SELECT parent_id FROM comments WHERE comment_id = ?1",
              rusqlite::params![current],
              |r| r.get(0),
            )
            .optional()?;

          match parent {
            // The requested comment itself is missing.
            None if depth == 0 => return Ok(None),
            // Parent links are FK-constrained; a missing row mid-walk just
            // ends the chain.
            None | Some(None) => return Ok(Some(depth)),
            Some(Some(p)) => {
              depth += 1;
              if depth >= MAX_REPLY_DEPTH {
                return Ok(Some(depth));
              }
              current = p;
            }
          }
        }
      })
      .await?;

    Ok(depth)
  }
}

/// Backslash-escape LIKE metacharacters so query text matches literally.
/// Pair with `ESCAPE '\'` on the LIKE clause.
fn escape_like(query: &str) -> String {
  let mut out = String::with_capacity(query.len());
  for ch in query.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out
}

// ─── Insert helpers (synchronous, shared with the import transaction) ────────

/// `true` for the UNIQUE violation on `people.slug` specifically.
fn is_slug_conflict(e: &rusqlite::Error) -> bool {
  match e {
    rusqlite::Error::SqliteFailure(info, Some(msg)) => {
      info.code == rusqlite::ErrorCode::ConstraintViolation && msg.contains("people.slug")
    }
    _ => false,
  }
}

/// Insert a person row, letting the slug UNIQUE constraint arbitrate
/// collisions: on conflict the candidate is re-suffixed (`-2`, `-3`, …) and
/// the insert retried until accepted. Works inside a transaction.
fn insert_person_row(
  conn: &rusqlite::Connection,
  new: &NewPerson,
  base: &str,
) -> rusqlite::Result<Person> {
  let person_id = Uuid::new_v4();
  let created_at = Utc::now();

  let id_str = encode_uuid(person_id);
  let at_str = encode_dt(created_at);
  let birth = new.birth_date.map(encode_date);
  let death = new.death_date.map(encode_date);
  let occupation = encode_occupation(&new.occupation);

  let mut attempt = 1u32;
  loop {
    let candidate = slug::numbered(base, attempt);
    let result = conn.execute(
      "INSERT INTO people (
         person_id, name, slug, image, biography,
         birth_date, death_date, occupation, nationality, created_at
       ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
      rusqlite::params![
        id_str,
        new.name,
        candidate,
        new.image,
        new.biography,
        birth,
        death,
        occupation,
        new.nationality,
        at_str,
      ],
    );

    match result {
      Ok(_) => {
        return Ok(Person {
          person_id,
          name: new.name.clone(),
          slug: candidate,
          image: new.image.clone(),
          biography: new.biography.clone(),
          birth_date: new.birth_date,
          death_date: new.death_date,
          occupation: new.occupation.clone(),
          nationality: new.nationality.clone(),
          created_at,
        });
      }
      Err(e) if is_slug_conflict(&e) => attempt += 1,
      Err(e) => return Err(e),
    }
  }
}

fn insert_life_event_row(
  conn: &rusqlite::Connection,
  person_id_str: &str,
  new: &NewLifeEvent,
) -> rusqlite::Result<String> {
  let event_id_str = encode_uuid(Uuid::new_v4());
  conn.execute(
    "INSERT INTO life_events (event_id, person_id, title, description, event_date)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    rusqlite::params![
      event_id_str,
      person_id_str,
      new.title,
      new.description,
      encode_date(new.event_date),
    ],
  )?;
  Ok(event_id_str)
}

// ─── BioStore impl ───────────────────────────────────────────────────────────

impl BioStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn add_person(&self, new: NewPerson) -> Result<Person> {
    let base = match new.slug.as_deref() {
      Some(explicit) => slug::slugify(explicit),
      None => slug::slugify(&new.name),
    };
    if base.is_empty() {
      return Err(Error::Core(memoir_core::Error::UnsluggableName(new.name)));
    }

    let person = self
      .conn
      .call(move |conn| Ok(insert_person_row(conn, &new, &base)?))
      .await?;
    Ok(person)
  }

  async fn get_person(&self, id: Uuid) -> Result<Option<Person>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE person_id = ?1"),
              rusqlite::params![id_str],
              |row| RawPerson::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn get_person_by_slug(&self, slug: &str) -> Result<Option<Person>> {
    let slug = slug.to_owned();

    let raw: Option<RawPerson> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PERSON_COLUMNS} FROM people WHERE slug = ?1"),
              rusqlite::params![slug],
              |row| RawPerson::from_row(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPerson::into_person).transpose()
  }

  async fn list_people(&self) -> Result<Vec<Person>> {
    let raws: Vec<RawPerson> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY name ASC"))?;
        let rows = stmt
          .query_map([], |row| RawPerson::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  async fn delete_person(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "DELETE FROM people WHERE person_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(rows > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn search_people(&self, query: &str) -> Result<Vec<Person>> {
    let pattern = format!("%{}%", escape_like(&query.to_lowercase()));

    let raws: Vec<RawPerson> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PERSON_COLUMNS} FROM people
           WHERE lower(name) LIKE ?1 ESCAPE '\\'
              OR lower(biography) LIKE ?1 ESCAPE '\\'
           ORDER BY name ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| RawPerson::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPerson::into_person).collect()
  }

  // ── Life events and evidence ──────────────────────────────────────────────

  async fn add_life_event(&self, person_id: Uuid, new: NewLifeEvent) -> Result<LifeEvent> {
    let person_id_str = encode_uuid(person_id);
    let returned = new.clone();

    let inserted: Option<String> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM people WHERE person_id = ?1",
            rusqlite::params![person_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }
        Ok(Some(insert_life_event_row(conn, &person_id_str, &new)?))
      })
      .await?;

    let event_id_str =
      inserted.ok_or(Error::Core(memoir_core::Error::PersonNotFound(person_id)))?;

    Ok(LifeEvent {
      event_id: decode_uuid(&event_id_str)?,
      person_id,
      title: returned.title,
      description: returned.description,
      event_date: returned.event_date,
    })
  }

  async fn list_life_events(&self, person_id: Uuid) -> Result<Vec<LifeEvent>> {
    let id_str = encode_uuid(person_id);

    let raws: Vec<RawLifeEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, person_id, title, description, event_date
           FROM life_events
           WHERE person_id = ?1
           ORDER BY event_date ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawLifeEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLifeEvent::into_life_event).collect()
  }

  async fn add_evidence(&self, event_id: Uuid, body: EvidenceBody) -> Result<Evidence> {
    let evidence = Evidence {
      evidence_id: Uuid::new_v4(),
      event_id,
      body,
      created_at: Utc::now(),
    };

    let evidence_id_str = encode_uuid(evidence.evidence_id);
    let event_id_str = encode_uuid(event_id);
    let kind = evidence.body.discriminant().to_owned();
    let content_json = evidence.body.to_json().map_err(Error::Core)?.to_string();
    let at_str = encode_dt(evidence.created_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM life_events WHERE event_id = ?1",
            rusqlite::params![event_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO evidence (evidence_id, event_id, kind, content_json, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![evidence_id_str, event_id_str, kind, content_json, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Core(memoir_core::Error::LifeEventNotFound(event_id)));
    }
    Ok(evidence)
  }

  async fn list_evidence(&self, event_id: Uuid) -> Result<Vec<Evidence>> {
    let id_str = encode_uuid(event_id);

    let raws: Vec<RawEvidence> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT evidence_id, event_id, kind, content_json, created_at
           FROM evidence
           WHERE event_id = ?1
           ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawEvidence::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvidence::into_evidence).collect()
  }

  // ── View tracking ─────────────────────────────────────────────────────────

  async fn record_click(&self, person_id: Uuid, viewed_at: DateTime<Utc>) -> Result<()> {
    let click_id_str = encode_uuid(Uuid::new_v4());
    let person_id_str = encode_uuid(person_id);
    let at_str = encode_dt(viewed_at);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM people WHERE person_id = ?1",
            rusqlite::params![person_id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO person_clicks (click_id, person_id, viewed_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![click_id_str, person_id_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::Core(memoir_core::Error::PersonNotFound(person_id)));
    }
    Ok(())
  }

  async fn trending(
    &self,
    period: TrendingPeriod,
    now: DateTime<Utc>,
  ) -> Result<Vec<TrendingEntry>> {
    let since = period.window_start(now).map(encode_dt);

    // The inner join both counts and excludes zero-click people; ordering is
    // produced by the aggregation itself so rank survives into the output.
    let raws: Vec<(RawPerson, i64)> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(since) = since {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS_P}, COUNT(c.click_id) AS clicks
             FROM people p
             JOIN person_clicks c ON c.person_id = p.person_id
             WHERE c.viewed_at >= ?1
             GROUP BY p.person_id
             ORDER BY clicks DESC, p.person_id ASC"
          ))?;
          stmt
            .query_map(rusqlite::params![since], |row| {
              Ok((RawPerson::from_row(row, 0)?, row.get(10)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {PERSON_COLUMNS_P}, COUNT(c.click_id) AS clicks
             FROM people p
             JOIN person_clicks c ON c.person_id = p.person_id
             GROUP BY p.person_id
             ORDER BY clicks DESC, p.person_id ASC"
          ))?;
          stmt
            .query_map([], |row| Ok((RawPerson::from_row(row, 0)?, row.get(10)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, clicks)| {
        Ok(TrendingEntry { person: raw.into_person()?, clicks: clicks as u64 })
      })
      .collect()
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, new: NewComment) -> Result<Comment> {
    new.validate().map_err(Error::Core)?;

    if !self.target_exists(new.target).await? {
      return Err(Error::Core(memoir_core::Error::TargetNotFound {
        kind: new.target.discriminant(),
        id:   new.target.id(),
      }));
    }

    if let Some(parent_id) = new.parent {
      let depth = self
        .comment_depth(parent_id)
        .await?
        .ok_or(Error::Core(memoir_core::Error::CommentNotFound(parent_id)))?;
      if depth + 1 >= MAX_REPLY_DEPTH {
        return Err(Error::Core(memoir_core::Error::ReplyTooDeep {
          max: MAX_REPLY_DEPTH - 1,
        }));
      }
    }

    let comment = Comment {
      comment_id: Uuid::new_v4(),
      target:     new.target,
      user_name:  new.user_name,
      body:       new.body,
      created_at: Utc::now(),
      is_public:  true,
      is_removed: false,
      parent:     new.parent,
    };

    let id_str = encode_uuid(comment.comment_id);
    let kind = comment.target.discriminant().to_owned();
    let target_id_str = encode_uuid(comment.target.id());
    let user_name = comment.user_name.clone();
    let body = comment.body.clone();
    let at_str = encode_dt(comment.created_at);
    let parent_str = comment.parent.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (
             comment_id, target_kind, target_id, user_name, body,
             created_at, is_public, is_removed, parent_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, 0, ?7)",
          rusqlite::params![id_str, kind, target_id_str, user_name, body, at_str, parent_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(comment)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn list_comments(
    &self,
    target: CommentTarget,
    include_hidden: bool,
  ) -> Result<Vec<Comment>> {
    let kind = target.discriminant().to_owned();
    let target_id_str = encode_uuid(target.id());

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let visibility = if include_hidden { "" } else { "AND is_public = 1" };
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE target_kind = ?1 AND target_id = ?2 {visibility}
           ORDER BY created_at ASC, rowid ASC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![kind, target_id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn target_exists(&self, target: CommentTarget) -> Result<bool> {
    let id_str = encode_uuid(target.id());
    let sql = match target {
      CommentTarget::Person(_) => "SELECT 1 FROM people WHERE person_id = ?1",
      CommentTarget::LifeEvent(_) => "SELECT 1 FROM life_events WHERE event_id = ?1",
    };

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(sql, rusqlite::params![id_str], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn moderate_comment(
    &self,
    id: Uuid,
    is_public: Option<bool>,
    is_removed: Option<bool>,
  ) -> Result<Comment> {
    let id_str = encode_uuid(id);

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        let rows = conn.execute(
          "UPDATE comments
           SET is_public  = COALESCE(?2, is_public),
               is_removed = COALESCE(?3, is_removed)
           WHERE comment_id = ?1",
          rusqlite::params![id_str, is_public, is_removed],
        )?;
        if rows == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(Error::Core(memoir_core::Error::CommentNotFound(id)))?
      .into_comment()
  }

  // ── Bulk import ───────────────────────────────────────────────────────────

  async fn import_person(
    &self,
    record: ImportRecord,
    mode: ImportMode,
  ) -> Result<ImportOutcome> {
    let base = slug::slugify(&record.name);
    if base.is_empty() {
      return Err(Error::Core(memoir_core::Error::UnsluggableName(record.name)));
    }

    let (person_id_str, created, events_created, skipped) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT person_id FROM people WHERE name = ?1
             ORDER BY created_at ASC LIMIT 1",
            rusqlite::params![record.name],
            |r| r.get(0),
          )
          .optional()?;

        let (person_id_str, created) = match existing {
          Some(id_str) => {
            if mode == ImportMode::Update {
              tx.execute(
                "UPDATE people
                 SET biography = ?2, birth_date = ?3, death_date = ?4,
                     occupation = ?5, nationality = ?6
                 WHERE person_id = ?1",
                rusqlite::params![
                  id_str,
                  record.biography,
                  record.birth_date.map(encode_date),
                  record.death_date.map(encode_date),
                  encode_occupation(&record.occupation),
                  record.nationality,
                ],
              )?;
            }
            (id_str, false)
          }
          None => {
            let new = NewPerson {
              name:        record.name.clone(),
              slug:        None,
              image:       None,
              biography:   record.biography.clone(),
              birth_date:  record.birth_date,
              death_date:  record.death_date,
              occupation:  record.occupation.clone(),
              nationality: record.nationality.clone(),
            };
            let person = insert_person_row(&tx, &new, &base)?;
            (encode_uuid(person.person_id), true)
          }
        };

        // Update mode replaces the event set wholesale; evidence cascades.
        if mode == ImportMode::Update {
          tx.execute(
            "DELETE FROM life_events WHERE person_id = ?1",
            rusqlite::params![person_id_str],
          )?;
        }

        let mut events_created = 0usize;
        let mut skipped = Vec::new();
        for event in &record.life_events {
          match event.complete() {
            Some(new_event) => {
              insert_life_event_row(&tx, &person_id_str, &new_event)?;
              events_created += 1;
            }
            None => skipped.push(event.label().to_owned()),
          }
        }

        tx.commit()?;
        Ok((person_id_str, created, events_created, skipped))
      })
      .await?;

    Ok(ImportOutcome {
      person_id: decode_uuid(&person_id_str)?,
      created,
      events_created,
      skipped,
    })
  }
}
