//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use lineage_core::InvalidEntity;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] lineage_store_sqlite::Error),
}

impl From<lineage_store_sqlite::Error> for ApiError {
  fn from(e: lineage_store_sqlite::Error) -> Self {
    use lineage_core::Error as Core;
    use lineage_store_sqlite::Error as StoreError;

    match e {
      StoreError::Core(Core::NotFound { .. }) => ApiError::NotFound(e.to_string()),
      StoreError::Core(Core::InvalidEntity(_)) => ApiError::BadRequest(e.to_string()),
      e if e.is_constraint_violation() => ApiError::Conflict(e.to_string()),
      e => ApiError::Store(e),
    }
  }
}

impl From<lineage_core::Error> for ApiError {
  fn from(e: lineage_core::Error) -> Self { lineage_store_sqlite::Error::Core(e).into() }
}

impl From<InvalidEntity> for ApiError {
  fn from(e: InvalidEntity) -> Self { ApiError::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
