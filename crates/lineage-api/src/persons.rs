//! Handlers for `/persons` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/persons` | Sorted by full name |
//! | `POST` | `/persons` | Body: person details, `id` optional |
//! | `GET`  | `/persons/next-id` | `{"id": n}` |
//! | `GET`  | `/persons/:id` | 404 if not found |
//! | `PUT`  | `/persons/:id` | Body: person details |
//! | `DELETE` | `/persons/:id` | Cascades to relationships and avatar |
//! | `GET`  | `/persons/:id/{spouses,parents,children,marriages}` | Empty list if none |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lineage_core::{
  PersonId,
  graph::GenealogyGraph,
  marriage::Marriage,
  person::{Person, PersonDetails},
  store::{EntityManager, SingleKeyManager},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{ApiState, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /persons`
pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<Person>>, ApiError> {
  let mut persons = state.store.persons().get_all().await?;
  persons.sort_by(|a, b| a.full_name().cmp(&b.full_name()).then(a.id().cmp(&b.id())));
  Ok(Json(persons))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  /// Reserved from the auto-increment counter when absent.
  pub id:      Option<PersonId>,
  #[serde(flatten)]
  pub details: PersonDetails,
}

/// `POST /persons`
pub async fn create(
  State(state): State<ApiState>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let id = match body.id {
    Some(id) => id,
    None => state.store.next_available_id().await?,
  };
  let person = state.store.persons().add(Person::new(id, body.details)?).await?;
  info!(person_id = %id, "created person");

  if let Some(sync) = &state.sync
    && sync.send(person.clone()).is_err()
  {
    warn!(person_id = %id, "sync worker has stopped; person not uploaded");
  }
  Ok((StatusCode::CREATED, Json(person)))
}

#[derive(Debug, Serialize)]
pub struct NextId {
  pub id: PersonId,
}

/// `GET /persons/next-id`
pub async fn next_id(State(state): State<ApiState>) -> Result<Json<NextId>, ApiError> {
  Ok(Json(NextId { id: state.store.next_available_id().await? }))
}

// ─── Single person ────────────────────────────────────────────────────────────

/// `GET /persons/:id`
pub async fn get_one(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError> {
  Ok(Json(state.store.persons().get(id).await?))
}

/// `PUT /persons/:id`
pub async fn update(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
  Json(details): Json<PersonDetails>,
) -> Result<Json<Person>, ApiError> {
  let person = state.store.persons().update(id, Person::new(id, details)?).await?;
  Ok(Json(person))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub marriages_removed: usize,
  pub children_removed:  usize,
  /// Why the avatar could not be removed, if it could not.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub avatar_error:      Option<String>,
}

/// `DELETE /persons/:id`
pub async fn remove(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Deleted>, ApiError> {
  let outcome = state.store.delete_person(id).await?;
  Ok(Json(Deleted {
    marriages_removed: outcome.marriages_removed,
    children_removed:  outcome.children_removed,
    avatar_error:      outcome.avatar_failure.map(|e| e.to_string()),
  }))
}

// ─── Graph lookups ────────────────────────────────────────────────────────────

/// `GET /persons/:id/spouses`
pub async fn spouses(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError> {
  Ok(Json(sorted(state.store.spouses_of(id).await?)))
}

/// `GET /persons/:id/parents`
pub async fn parents(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError> {
  Ok(Json(sorted(state.store.parents_of(id).await?)))
}

/// `GET /persons/:id/children`
pub async fn children(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Person>>, ApiError> {
  Ok(Json(sorted(state.store.children_of(id).await?)))
}

/// `GET /persons/:id/marriages`
pub async fn marriages(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
) -> Result<Json<Vec<Marriage>>, ApiError> {
  let mut marriages = state.store.marriages_of(id).await?;
  marriages.sort_by_key(Marriage::start_date);
  Ok(Json(marriages))
}

fn sorted(mut people: Vec<Person>) -> Vec<Person> {
  people.sort_by(Person::cmp_by_birth);
  people
}
