//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, Utc};
use memoir_core::{
  comment::{CommentTarget, NewComment},
  import::{ImportEvent, ImportMode, ImportRecord},
  person::{EvidenceBody, NewLifeEvent, NewPerson},
  store::BioStore,
  trending::TrendingPeriod,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn born_event() -> NewLifeEvent {
  NewLifeEvent {
    title:       "Born".into(),
    description: "Birth".into(),
    event_date:  date("1990-01-01"),
  }
}

// ─── People and slugs ────────────────────────────────────────────────────────

#[tokio::test]
async fn add_person_derives_slug_from_name() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  assert_eq!(person.slug, "jane-doe");

  let fetched = s.get_person_by_slug("jane-doe").await.unwrap().unwrap();
  assert_eq!(fetched.person_id, person.person_id);
}

#[tokio::test]
async fn same_name_gets_numeric_suffix_starting_at_two() {
  let s = store().await;
  let first = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let second = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let third = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();

  assert_eq!(first.slug, "jane-doe");
  assert_eq!(second.slug, "jane-doe-2");
  assert_eq!(third.slug, "jane-doe-3");
}

#[tokio::test]
async fn explicit_slug_is_used_as_base() {
  let s = store().await;
  let mut new = NewPerson::named("Jane Doe");
  new.slug = Some("the-real-jane".into());
  let person = s.add_person(new).await.unwrap();
  assert_eq!(person.slug, "the-real-jane");
}

#[tokio::test]
async fn unsluggable_name_is_rejected() {
  let s = store().await;
  let err = s.add_person(NewPerson::named("!!!")).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::UnsluggableName(_))
  ));
}

#[tokio::test]
async fn person_fields_roundtrip() {
  let s = store().await;
  let new = NewPerson {
    name:        "Ada Lovelace".into(),
    slug:        None,
    image:       Some("persons/ada.jpg".into()),
    biography:   "First programmer.".into(),
    birth_date:  Some(date("1815-12-10")),
    death_date:  Some(date("1852-11-27")),
    occupation:  vec!["Mathematician".into(), "Writer".into()],
    nationality: Some("GB".into()),
  };
  let person = s.add_person(new).await.unwrap();

  let fetched = s.get_person(person.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Ada Lovelace");
  assert_eq!(fetched.image.as_deref(), Some("persons/ada.jpg"));
  assert_eq!(fetched.birth_date, Some(date("1815-12-10")));
  assert_eq!(fetched.death_date, Some(date("1852-11-27")));
  assert_eq!(fetched.occupation, vec!["Mathematician", "Writer"]);
  assert_eq!(fetched.nationality.as_deref(), Some("GB"));
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.get_person_by_slug("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn search_is_case_insensitive_over_name_and_biography() {
  let s = store().await;
  let mut ada = NewPerson::named("Ada Lovelace");
  ada.biography = "Analytical engine notes.".into();
  s.add_person(ada).await.unwrap();
  s.add_person(NewPerson::named("Alan Turing")).await.unwrap();

  let by_name = s.search_people("lovelace").await.unwrap();
  assert_eq!(by_name.len(), 1);
  assert_eq!(by_name[0].name, "Ada Lovelace");

  let by_bio = s.search_people("ANALYTICAL").await.unwrap();
  assert_eq!(by_bio.len(), 1);

  assert!(s.search_people("hopper").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_treats_like_metacharacters_as_literals() {
  let s = store().await;
  s.add_person(NewPerson::named("Jane Doe")).await.unwrap();

  // No row contains a literal % or _, so these must match nothing instead
  // of wildcarding across every row.
  assert!(s.search_people("%").await.unwrap().is_empty());
  assert!(s.search_people("_").await.unwrap().is_empty());
  assert!(s.search_people("J_ne").await.unwrap().is_empty());

  let mut pct = NewPerson::named("Percy Cent");
  pct.biography = "Gave 100% effort.".into();
  s.add_person(pct).await.unwrap();

  let hits = s.search_people("100%").await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].name, "Percy Cent");
}

// ─── Life events and evidence ────────────────────────────────────────────────

#[tokio::test]
async fn life_events_are_listed_by_date() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();

  s.add_life_event(
    person.person_id,
    NewLifeEvent {
      title:       "Graduated".into(),
      description: "University".into(),
      event_date:  date("2012-06-01"),
    },
  )
  .await
  .unwrap();
  s.add_life_event(person.person_id, born_event()).await.unwrap();

  let events = s.list_life_events(person.person_id).await.unwrap();
  assert_eq!(events.len(), 2);
  assert_eq!(events[0].title, "Born");
  assert_eq!(events[1].title, "Graduated");
}

#[tokio::test]
async fn add_life_event_to_missing_person_errors() {
  let s = store().await;
  let err = s.add_life_event(Uuid::new_v4(), born_event()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::PersonNotFound(_))
  ));
}

#[tokio::test]
async fn evidence_roundtrips_every_kind() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let event = s.add_life_event(person.person_id, born_event()).await.unwrap();

  let bodies = [
    EvidenceBody::Text("hospital record".into()),
    EvidenceBody::Link("https://example.com/registry".into()),
    EvidenceBody::Image("evidence/cert.jpg".into()),
    EvidenceBody::Video("evidence/news.mp4".into()),
  ];
  for body in &bodies {
    s.add_evidence(event.event_id, body.clone()).await.unwrap();
  }

  let stored = s.list_evidence(event.event_id).await.unwrap();
  assert_eq!(stored.len(), 4);
  for (evidence, body) in stored.iter().zip(&bodies) {
    assert_eq!(&evidence.body, body);
  }
}

#[tokio::test]
async fn evidence_for_missing_event_errors() {
  let s = store().await;
  let err = s
    .add_evidence(Uuid::new_v4(), EvidenceBody::Text("x".into()))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::LifeEventNotFound(_))
  ));
}

#[tokio::test]
async fn deleting_a_person_cascades_events_but_orphans_comments() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let event = s.add_life_event(person.person_id, born_event()).await.unwrap();
  s.record_click(person.person_id, Utc::now()).await.unwrap();

  let target = CommentTarget::Person(person.person_id);
  let comment = s.add_comment(NewComment::new(target, "rip")).await.unwrap();

  assert!(s.delete_person(person.person_id).await.unwrap());
  assert!(s.get_person(person.person_id).await.unwrap().is_none());
  assert!(s.list_life_events(person.person_id).await.unwrap().is_empty());
  assert!(s.list_evidence(event.event_id).await.unwrap().is_empty());

  // The comment survives as an orphan; its target no longer resolves.
  let orphan = s.get_comment(comment.comment_id).await.unwrap();
  assert!(orphan.is_some());
  assert!(!s.target_exists(target).await.unwrap());
}

#[tokio::test]
async fn delete_missing_person_returns_false() {
  let s = store().await;
  assert!(!s.delete_person(Uuid::new_v4()).await.unwrap());
}

// ─── Trending ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn trending_orders_by_click_count_descending() {
  let s = store().await;
  let now = Utc::now();

  let a = s.add_person(NewPerson::named("Alex Kim")).await.unwrap();
  let b = s.add_person(NewPerson::named("Mina Park")).await.unwrap();
  let c = s.add_person(NewPerson::named("Joon Lee")).await.unwrap();
  let quiet = s.add_person(NewPerson::named("Soo Jin")).await.unwrap();

  for _ in 0..5 {
    s.record_click(a.person_id, now - Duration::hours(2)).await.unwrap();
  }
  for _ in 0..3 {
    s.record_click(b.person_id, now - Duration::hours(2)).await.unwrap();
  }
  s.record_click(c.person_id, now - Duration::hours(2)).await.unwrap();

  let ranked = s.trending(TrendingPeriod::Day, now).await.unwrap();
  let counts: Vec<u64> = ranked.iter().map(|e| e.clicks).collect();
  assert_eq!(counts, vec![5, 3, 1]);
  assert_eq!(ranked[0].person.person_id, a.person_id);
  assert_eq!(ranked[1].person.person_id, b.person_id);
  assert_eq!(ranked[2].person.person_id, c.person_id);

  // Zero-click people are excluded, not ranked last.
  assert!(ranked.iter().all(|e| e.person.person_id != quiet.person_id));
}

#[tokio::test]
async fn trending_day_window_excludes_old_clicks() {
  let s = store().await;
  let now = Utc::now();

  let recent = s.add_person(NewPerson::named("Recent")).await.unwrap();
  let stale = s.add_person(NewPerson::named("Stale")).await.unwrap();

  s.record_click(recent.person_id, now - Duration::hours(2)).await.unwrap();
  s.record_click(stale.person_id, now - Duration::days(10)).await.unwrap();

  let day = s.trending(TrendingPeriod::Day, now).await.unwrap();
  assert_eq!(day.len(), 1);
  assert_eq!(day[0].person.person_id, recent.person_id);

  let all = s.trending(TrendingPeriod::All, now).await.unwrap();
  assert_eq!(all.len(), 2);

  let week = s.trending(TrendingPeriod::Week, now).await.unwrap();
  assert_eq!(week.len(), 1);

  let month = s.trending(TrendingPeriod::Month, now).await.unwrap();
  assert_eq!(month.len(), 2);
}

#[tokio::test]
async fn trending_ties_break_on_person_id_ascending() {
  let s = store().await;
  let now = Utc::now();

  let x = s.add_person(NewPerson::named("Tied One")).await.unwrap();
  let y = s.add_person(NewPerson::named("Tied Two")).await.unwrap();
  for id in [x.person_id, y.person_id] {
    s.record_click(id, now - Duration::hours(1)).await.unwrap();
    s.record_click(id, now - Duration::hours(1)).await.unwrap();
  }

  let ranked = s.trending(TrendingPeriod::Day, now).await.unwrap();
  assert_eq!(ranked.len(), 2);
  assert_eq!(ranked[0].clicks, 2);
  assert_eq!(ranked[1].clicks, 2);
  assert!(
    ranked[0].person.person_id.to_string() <= ranked[1].person.person_id.to_string()
  );
}

#[tokio::test]
async fn click_for_missing_person_errors() {
  let s = store().await;
  let err = s.record_click(Uuid::new_v4(), Utc::now()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::PersonNotFound(_))
  ));
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn replies_allowed_to_depth_two_rejected_at_three() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let target = CommentTarget::Person(person.person_id);

  let root = s.add_comment(NewComment::new(target, "root")).await.unwrap();

  let mut reply = NewComment::new(target, "first reply");
  reply.parent = Some(root.comment_id);
  let reply = s.add_comment(reply).await.unwrap();

  let mut reply2 = NewComment::new(target, "second reply");
  reply2.parent = Some(reply.comment_id);
  let reply2 = s.add_comment(reply2).await.unwrap();

  let mut reply3 = NewComment::new(target, "too deep");
  reply3.parent = Some(reply2.comment_id);
  let err = s.add_comment(reply3).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::ReplyTooDeep { .. })
  ));
}

#[tokio::test]
async fn comment_on_missing_target_errors() {
  let s = store().await;
  let err = s
    .add_comment(NewComment::new(CommentTarget::Person(Uuid::new_v4()), "hello"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::TargetNotFound { .. })
  ));
}

#[tokio::test]
async fn reply_to_missing_parent_errors() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();

  let mut new = NewComment::new(CommentTarget::Person(person.person_id), "hi");
  new.parent = Some(Uuid::new_v4());
  let err = s.add_comment(new).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::CommentNotFound(_))
  ));
}

#[tokio::test]
async fn comments_attach_to_life_events_too() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let event = s.add_life_event(person.person_id, born_event()).await.unwrap();

  let target = CommentTarget::LifeEvent(event.event_id);
  s.add_comment(NewComment::new(target, "source?")).await.unwrap();

  let thread = s.list_comments(target, false).await.unwrap();
  assert_eq!(thread.len(), 1);
  assert_eq!(thread[0].body, "source?");
}

#[tokio::test]
async fn thread_is_ordered_by_creation_time() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let target = CommentTarget::Person(person.person_id);

  s.add_comment(NewComment::new(target, "first")).await.unwrap();
  s.add_comment(NewComment::new(target, "second")).await.unwrap();
  s.add_comment(NewComment::new(target, "third")).await.unwrap();

  let thread = s.list_comments(target, false).await.unwrap();
  let bodies: Vec<&str> = thread.iter().map(|c| c.body.as_str()).collect();
  assert_eq!(bodies, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn removal_keeps_the_row_and_hiding_drops_it_from_the_thread() {
  let s = store().await;
  let person = s.add_person(NewPerson::named("Jane Doe")).await.unwrap();
  let target = CommentTarget::Person(person.person_id);

  let kept = s.add_comment(NewComment::new(target, "rude")).await.unwrap();
  let hidden = s.add_comment(NewComment::new(target, "spam")).await.unwrap();

  let removed = s
    .moderate_comment(kept.comment_id, None, Some(true))
    .await
    .unwrap();
  assert!(removed.is_removed);
  assert!(removed.is_public);

  s.moderate_comment(hidden.comment_id, Some(false), None).await.unwrap();

  // The removed comment stays in the thread (placeholder display is the
  // caller's job); the non-public one disappears unless hidden are included.
  let visible = s.list_comments(target, false).await.unwrap();
  assert_eq!(visible.len(), 1);
  assert_eq!(visible[0].comment_id, kept.comment_id);
  assert!(visible[0].is_removed);

  let everything = s.list_comments(target, true).await.unwrap();
  assert_eq!(everything.len(), 2);
}

#[tokio::test]
async fn moderate_missing_comment_errors() {
  let s = store().await;
  let err = s
    .moderate_comment(Uuid::new_v4(), Some(false), None)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(memoir_core::Error::CommentNotFound(_))
  ));
}

// ─── Bulk import ─────────────────────────────────────────────────────────────

fn jane_record(events: Vec<ImportEvent>) -> ImportRecord {
  ImportRecord {
    name:        "Jane Doe".into(),
    biography:   "A test biography.".into(),
    birth_date:  Some(date("1990-01-01")),
    death_date:  None,
    occupation:  vec!["Engineer".into()],
    nationality: Some("KR".into()),
    life_events: events,
  }
}

fn import_event(title: &str, date_str: Option<&str>) -> ImportEvent {
  ImportEvent {
    title:       Some(title.into()),
    description: Some("desc".into()),
    event_date:  date_str.map(str::to_owned),
  }
}

#[tokio::test]
async fn create_mode_builds_person_and_events() {
  let s = store().await;
  let outcome = s
    .import_person(
      jane_record(vec![import_event("Born", Some("1990-01-01"))]),
      ImportMode::Create,
    )
    .await
    .unwrap();

  assert!(outcome.created);
  assert_eq!(outcome.events_created, 1);
  assert!(outcome.skipped.is_empty());

  let person = s.get_person_by_slug("jane-doe").await.unwrap().unwrap();
  assert_eq!(person.person_id, outcome.person_id);
  assert_eq!(person.occupation, vec!["Engineer"]);

  let events = s.list_life_events(person.person_id).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].event_date, date("1990-01-01"));
}

#[tokio::test]
async fn update_mode_import_is_idempotent() {
  let s = store().await;

  let first = jane_record(vec![
    import_event("Born", Some("1990-01-01")),
    import_event("Graduated", Some("2012-06-01")),
  ]);
  s.import_person(first, ImportMode::Update).await.unwrap();

  let second = jane_record(vec![import_event("Born", Some("1990-01-01"))]);
  let outcome = s.import_person(second, ImportMode::Update).await.unwrap();
  assert!(!outcome.created);

  // Exactly one person row and exactly the second import's events.
  let people = s.search_people("jane").await.unwrap();
  assert_eq!(people.len(), 1);

  let events = s.list_life_events(outcome.person_id).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "Born");
}

#[tokio::test]
async fn create_mode_reuses_existing_person_and_appends_events() {
  let s = store().await;
  s.import_person(
    jane_record(vec![import_event("Born", Some("1990-01-01"))]),
    ImportMode::Create,
  )
  .await
  .unwrap();

  let outcome = s
    .import_person(
      jane_record(vec![import_event("Graduated", Some("2012-06-01"))]),
      ImportMode::Create,
    )
    .await
    .unwrap();
  assert!(!outcome.created);

  let events = s.list_life_events(outcome.person_id).await.unwrap();
  assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn incomplete_events_are_skipped_and_the_rest_commit() {
  let s = store().await;
  let record = jane_record(vec![
    import_event("Born", Some("1990-01-01")),
    import_event("Mystery", None),
    import_event("Bad date", Some("January 1st")),
    import_event("Graduated", Some("2012-06-01")),
  ]);

  let outcome = s.import_person(record, ImportMode::Create).await.unwrap();
  assert_eq!(outcome.events_created, 2);
  assert_eq!(outcome.skipped, vec!["Mystery".to_string(), "Bad date".to_string()]);

  let events = s.list_life_events(outcome.person_id).await.unwrap();
  assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn import_failure_after_person_insert_rolls_back_everything() {
  let s = store().await;

  // An aborting trigger makes the second event's insert fail mid-import.
  s.execute_batch_raw(
    "CREATE TRIGGER abort_on_sentinel BEFORE INSERT ON life_events
     WHEN NEW.title = 'Sentinel' BEGIN
       SELECT RAISE(ABORT, 'sentinel event');
     END;",
  )
  .await
  .unwrap();

  let record = jane_record(vec![
    import_event("Born", Some("1990-01-01")),
    import_event("Sentinel", Some("1991-01-01")),
  ]);
  assert!(s.import_person(record, ImportMode::Create).await.is_err());

  // The person insert preceded the failure but must not survive it.
  assert!(s.get_person_by_slug("jane-doe").await.unwrap().is_none());
  assert!(s.search_people("jane").await.unwrap().is_empty());
}

#[tokio::test]
async fn import_slug_matches_plain_creation() {
  let s = store().await;
  let outcome = s
    .import_person(jane_record(vec![]), ImportMode::Create)
    .await
    .unwrap();
  let person = s.get_person(outcome.person_id).await.unwrap().unwrap();
  assert_eq!(person.slug, "jane-doe");
}
