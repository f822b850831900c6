//! `GET /events`: birthdays and wedding anniversaries in calendar order.

use axum::{Json, extract::State};
use lineage_core::event::Event;

use crate::{ApiState, error::ApiError};

pub async fn handler(State(state): State<ApiState>) -> Result<Json<Vec<Event>>, ApiError> {
  Ok(Json(state.store.events().await?))
}
