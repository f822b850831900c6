//! `GET /persons/:id/tree[?direction=descendants|ancestors][&height=<n>]`
//!
//! Builds the tree over a read snapshot so the walk sees one consistent
//! state of the database. Without `height` every layer is returned.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use lineage_core::{
  PersonId,
  tree::{Direction, TreeItem},
  view::TreeView,
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TreeParams {
  #[serde(default)]
  pub direction: Direction,
  pub height:    Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
  pub root_id:     PersonId,
  pub direction:   Direction,
  /// Layers included in `items`.
  pub height:      usize,
  /// Layers in the complete tree; the largest useful `height`.
  pub full_height: usize,
  pub items:       Vec<TreeItem>,
}

pub async fn handler(
  State(state): State<ApiState>,
  Path(id): Path<PersonId>,
  Query(params): Query<TreeParams>,
) -> Result<Json<TreeResponse>, ApiError> {
  if params.height == Some(0) {
    return Err(ApiError::BadRequest("height must be at least 1".into()));
  }

  let snapshot = state.store.snapshot().await?;
  let root = snapshot.require(id)?.clone();

  let mut view = TreeView::new();
  let items = view.show(&snapshot, root, params.direction, params.height).await?.to_vec();
  let full_height = view.layer_choices().map_or(1, |r| *r.end());

  Ok(Json(TreeResponse {
    root_id: id,
    direction: params.direction,
    height: view.height().unwrap_or(full_height),
    full_height,
    items,
  }))
}
