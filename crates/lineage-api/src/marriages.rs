//! Handlers for `/marriages` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/marriages` | All marriages |
//! | `POST` | `/marriages` | 409 if the pair is already married |
//! | `GET`  | `/marriages/:a/:b` | Either order |
//! | `PUT`  | `/marriages/:a/:b` | Replaces the row for the pair |
//! | `DELETE` | `/marriages/:a/:b` | 404 if absent |
//! | `PUT`  | `/persons/:id/marriages` | Full replace of a person's marriages |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lineage_core::{
  PersonId,
  error::EntityKind,
  marriage::{Marriage, MarriageColumn, MarriageRecord},
  query::Query,
  store::{EntityManager, RelationshipManager},
};

use crate::{ApiState, error::ApiError};

fn validate(records: Vec<MarriageRecord>) -> Result<Vec<Marriage>, ApiError> {
  records
    .into_iter()
    .map(|r| Marriage::try_from(r).map_err(ApiError::from))
    .collect()
}

/// `GET /marriages`
pub async fn list(State(state): State<ApiState>) -> Result<Json<Vec<Marriage>>, ApiError> {
  let mut marriages = state.store.marriages().get_all().await?;
  marriages.sort_by_key(|m| (m.key(), m.start_date()));
  Ok(Json(marriages))
}

/// `POST /marriages`
pub async fn create(
  State(state): State<ApiState>,
  Json(body): Json<MarriageRecord>,
) -> Result<impl IntoResponse, ApiError> {
  let marriage = state.store.marriages().add(Marriage::try_from(body)?).await?;
  Ok((StatusCode::CREATED, Json(marriage)))
}

/// `GET /marriages/:a/:b`
pub async fn get_one(
  State(state): State<ApiState>,
  Path((a, b)): Path<(PersonId, PersonId)>,
) -> Result<Json<Marriage>, ApiError> {
  Ok(Json(RelationshipManager::get(&state.store.marriages(), a, b).await?))
}

/// `PUT /marriages/:a/:b`
pub async fn update(
  State(state): State<ApiState>,
  Path((a, b)): Path<(PersonId, PersonId)>,
  Json(body): Json<MarriageRecord>,
) -> Result<Json<Marriage>, ApiError> {
  let marriage = Marriage::try_from(body)?;
  Ok(Json(RelationshipManager::update(&state.store.marriages(), (a, b), marriage).await?))
}

/// `DELETE /marriages/:a/:b`
pub async fn remove(
  State(state): State<ApiState>,
  Path((a, b)): Path<(PersonId, PersonId)>,
) -> Result<StatusCode, ApiError> {
  let query = Query::pair(MarriageColumn::Person1Id, MarriageColumn::Person2Id, a, b);
  match state.store.marriages().delete(query).await? {
    0 => Err(ApiError::NotFound(format!("{} not found: ({a}, {b})", EntityKind::Marriage))),
    _ => Ok(StatusCode::NO_CONTENT),
  }
}

/// `PUT /persons/:id/marriages`, body: the complete list of `id`'s marriages.
pub async fn replace_for_person(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
  Json(body): Json<Vec<MarriageRecord>>,
) -> Result<Json<Vec<Marriage>>, ApiError> {
  let marriages = validate(body)?;
  Ok(Json(state.store.update_marriages(id, marriages).await?))
}
