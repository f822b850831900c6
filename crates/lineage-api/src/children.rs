//! Handlers for parent-child links.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/children` | All links |
//! | `POST` | `/children` | Body: `{"parent_id":1,"child_id":2}` |
//! | `DELETE` | `/children/:parent/:child` | 404 if absent |
//! | `POST` | `/persons/:id/parents` | Body: `{"parent_id":1}` |
//! | `POST` | `/persons/:id/children` | Body: `{"child_id":2}` |
//! | `PUT`  | `/persons/:id/children` | Full replace of links naming `id`, as parent or child |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use lineage_core::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  error::EntityKind,
  query::{Filter, JoinType, Query},
  store::EntityManager,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  pub parent_id: PersonId,
  pub child_id:  PersonId,
}

impl TryFrom<LinkBody> for ChildRelationship {
  type Error = ApiError;

  fn try_from(body: LinkBody) -> Result<Self, ApiError> {
    Ok(ChildRelationship::new(body.parent_id, body.child_id)?)
  }
}

async fn add(
  state: &ApiState,
  link: ChildRelationship,
) -> Result<(StatusCode, Json<ChildRelationship>), ApiError> {
  let link = state.store.children().add(link).await?;
  Ok((StatusCode::CREATED, Json(link)))
}

/// `GET /children`
pub async fn list(
  State(state): State<ApiState>,
) -> Result<Json<Vec<ChildRelationship>>, ApiError> {
  let mut links = state.store.children().get_all().await?;
  links.sort_by_key(|l| (l.parent_id(), l.child_id()));
  Ok(Json(links))
}

/// `POST /children`
pub async fn create(
  State(state): State<ApiState>,
  Json(body): Json<LinkBody>,
) -> Result<impl IntoResponse, ApiError> {
  add(&state, body.try_into()?).await
}

#[derive(Debug, Deserialize)]
pub struct ParentBody {
  pub parent_id: PersonId,
}

/// `POST /persons/:id/parents`
pub async fn add_parent(
  State(state): State<ApiState>,
  Path(child_id): Path<PersonId>,
  Json(body): Json<ParentBody>,
) -> Result<impl IntoResponse, ApiError> {
  add(&state, ChildRelationship::new(body.parent_id, child_id)?).await
}

#[derive(Debug, Deserialize)]
pub struct ChildBody {
  pub child_id: PersonId,
}

/// `POST /persons/:id/children`
pub async fn add_child(
  State(state): State<ApiState>,
  Path(parent_id): Path<PersonId>,
  Json(body): Json<ChildBody>,
) -> Result<impl IntoResponse, ApiError> {
  add(&state, ChildRelationship::new(parent_id, body.child_id)?).await
}

/// `DELETE /children/:parent/:child`
pub async fn remove(
  State(state): State<ApiState>,
  Path((parent, child)): Path<(PersonId, PersonId)>,
) -> Result<StatusCode, ApiError> {
  let query = Query::builder()
    .add_filter(Filter::equal(ChildColumn::ParentId, parent))
    .add_filter(Filter::equal(ChildColumn::ChildId, child))
    .build(JoinType::And);
  match state.store.children().delete(query).await? {
    0 => Err(ApiError::NotFound(format!(
      "{} not found: ({parent}, {child})",
      EntityKind::ChildRelationship
    ))),
    _ => Ok(StatusCode::NO_CONTENT),
  }
}

/// `PUT /persons/:id/children`, body: every link that should name `id`,
/// as parent or as child. Links to `id`'s parents are replaced too, so a body
/// listing only children also removes those parent links.
pub async fn replace_for_person(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
  Json(body): Json<Vec<LinkBody>>,
) -> Result<Json<Vec<ChildRelationship>>, ApiError> {
  let links = body
    .into_iter()
    .map(ChildRelationship::try_from)
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Json(state.store.update_children(id, links).await?))
}
