//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | All people, name ascending |
//! | `POST`   | `/people` | Body: [`PersonBody`]; returns 201 |
//! | `GET`    | `/people/:slug` | Profile view; optional `?year=`; logs a click |
//! | `DELETE` | `/people/:slug` | 404 if not found |
//! | `POST`   | `/people/:slug/events` | Body: [`NewLifeEvent`]; returns 201 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Datelike as _, NaiveDate, Utc};
use memoir_core::{
  person::{LifeEvent, NewLifeEvent, NewPerson, Person},
  store::BioStore,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /people`
pub async fn list<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Person>>, ApiError>
where
  S: BioStore,
{
  let people = store.list_people().await.map_err(ApiError::from_store)?;
  Ok(Json(people))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /people`.
#[derive(Debug, Deserialize)]
pub struct PersonBody {
  pub name:        String,
  /// Explicit slug base; derived from `name` when absent.
  pub slug:        Option<String>,
  pub image:       Option<String>,
  #[serde(default)]
  pub biography:   String,
  pub birth_date:  Option<NaiveDate>,
  pub death_date:  Option<NaiveDate>,
  #[serde(default)]
  pub occupation:  Vec<String>,
  pub nationality: Option<String>,
}

impl From<PersonBody> for NewPerson {
  fn from(b: PersonBody) -> Self {
    NewPerson {
      name:        b.name,
      slug:        b.slug,
      image:       b.image,
      biography:   b.biography,
      birth_date:  b.birth_date,
      death_date:  b.death_date,
      occupation:  b.occupation,
      nationality: b.nationality,
    }
  }
}

/// `POST /people` — returns 201 + the stored [`Person`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PersonBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BioStore,
{
  let person = store
    .add_person(body.into())
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Detail ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DetailParams {
  /// Calendar year to filter life events to; defaults to the earliest year
  /// present.
  pub year: Option<i32>,
}

/// The profile read model: the person, the years their life events span, the
/// selected year, and that year's events.
#[derive(Debug, Serialize)]
pub struct ProfileView {
  pub person: Person,
  pub years:  Vec<i32>,
  pub year:   Option<i32>,
  pub events: Vec<LifeEvent>,
}

/// `GET /people/:slug[?year=]` — also appends one view click.
pub async fn detail<S>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
  Query(params): Query<DetailParams>,
) -> Result<Json<ProfileView>, ApiError>
where
  S: BioStore,
{
  let person = store
    .get_person_by_slug(&slug)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no person with slug {slug:?}")))?;

  store
    .record_click(person.person_id, Utc::now())
    .await
    .map_err(ApiError::from_store)?;

  let all_events = store
    .list_life_events(person.person_id)
    .await
    .map_err(ApiError::from_store)?;

  let mut years: Vec<i32> = all_events.iter().map(|e| e.event_date.year()).collect();
  years.sort_unstable();
  years.dedup();

  let year = params.year.or_else(|| years.first().copied());
  let events = match year {
    Some(y) => all_events
      .into_iter()
      .filter(|e| e.event_date.year() == y)
      .collect(),
    None => Vec::new(),
  };

  Ok(Json(ProfileView { person, years, year, events }))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /people/:slug` — 204 on success. Life events, evidence, and
/// clicks go with the person; comments stay behind as orphans.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: BioStore,
{
  let person = store
    .get_person_by_slug(&slug)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no person with slug {slug:?}")))?;

  store
    .delete_person(person.person_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Add life event ───────────────────────────────────────────────────────────

/// `POST /people/:slug/events` — returns 201 + the stored [`LifeEvent`].
pub async fn add_event<S>(
  State(store): State<Arc<S>>,
  Path(slug): Path<String>,
  Json(body): Json<NewLifeEvent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BioStore,
{
  let person = store
    .get_person_by_slug(&slug)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("no person with slug {slug:?}")))?;

  let event = store
    .add_life_event(person.person_id, body)
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(event)))
}
