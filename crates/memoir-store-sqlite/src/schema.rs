//! SQL schema for the Memoir SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- The UNIQUE constraint on slug is the final arbiter for concurrent
-- creations of the same name; the insert path retries with a suffix.
CREATE TABLE IF NOT EXISTS people (
    person_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    slug        TEXT NOT NULL UNIQUE,
    image       TEXT,
    biography   TEXT NOT NULL DEFAULT '',
    birth_date  TEXT,            -- ISO 8601 calendar date or NULL
    death_date  TEXT,
    occupation  TEXT,            -- comma-delimited role strings or NULL
    nationality TEXT,
    created_at  TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS life_events (
    event_id    TEXT PRIMARY KEY,
    person_id   TEXT NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    event_date  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS evidence (
    evidence_id  TEXT PRIMARY KEY,
    event_id     TEXT NOT NULL REFERENCES life_events(event_id) ON DELETE CASCADE,
    kind         TEXT NOT NULL,  -- discriminant of EvidenceBody variant
    content_json TEXT NOT NULL,  -- JSON payload (inner content only)
    created_at   TEXT NOT NULL
);

-- Append-only view log. No UPDATE is ever issued against this table and
-- rows are only read in aggregate.
CREATE TABLE IF NOT EXISTS person_clicks (
    click_id  TEXT PRIMARY KEY,
    person_id TEXT NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    viewed_at TEXT NOT NULL
);

-- target_kind/target_id deliberately carry no foreign key: comments outlive
-- their target and become orphans instead of cascading away.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    target_kind TEXT NOT NULL,   -- 'person' | 'life_event'
    target_id   TEXT NOT NULL,
    user_name   TEXT,
    body        TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    is_public   INTEGER NOT NULL DEFAULT 1,
    is_removed  INTEGER NOT NULL DEFAULT 0,
    parent_id   TEXT REFERENCES comments(comment_id)
);

CREATE INDEX IF NOT EXISTS life_events_person_idx ON life_events(person_id);
CREATE INDEX IF NOT EXISTS evidence_event_idx     ON evidence(event_id);
CREATE INDEX IF NOT EXISTS clicks_person_time_idx ON person_clicks(person_id, viewed_at);
CREATE INDEX IF NOT EXISTS comments_target_idx    ON comments(target_kind, target_id);
CREATE INDEX IF NOT EXISTS comments_removed_idx   ON comments(is_removed);

PRAGMA user_version = 1;
";
