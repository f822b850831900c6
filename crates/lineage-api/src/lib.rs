//! JSON REST API for Lineage.
//!
//! Exposes an axum [`Router`] over a [`SqliteStore`]: CRUD for persons,
//! marriages and parent-child links, graph lookups, flattened family trees
//! and the yearly event list. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lineage_api::api_router(state))
//! ```

pub mod children;
pub mod error;
pub mod events;
pub mod marriages;
pub mod persons;
pub mod tree;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get},
};
use lineage_core::person::Person;
use lineage_store_sqlite::SqliteStore;
use tokio::sync::mpsc::UnboundedSender;

pub use error::ApiError;

/// Shared state threaded through all handlers.
#[derive(Clone)]
pub struct ApiState {
  pub store: Arc<SqliteStore>,
  /// Newly created persons are sent here for upload to the remote service.
  pub sync:  Option<UnboundedSender<Person>>,
}

impl ApiState {
  pub fn new(store: SqliteStore) -> Self { Self { store: Arc::new(store), sync: None } }

  pub fn with_sync(mut self, sync: UnboundedSender<Person>) -> Self {
    self.sync = Some(sync);
    self
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router(state: ApiState) -> Router<()> {
  Router::new()
    // Persons
    .route("/persons", get(persons::list).post(persons::create))
    .route("/persons/next-id", get(persons::next_id))
    .route(
      "/persons/{id}",
      get(persons::get_one).put(persons::update).delete(persons::remove),
    )
    .route("/persons/{id}/spouses", get(persons::spouses))
    .route("/persons/{id}/parents", get(persons::parents).post(children::add_parent))
    .route(
      "/persons/{id}/children",
      get(persons::children).post(children::add_child).put(children::replace_for_person),
    )
    .route(
      "/persons/{id}/marriages",
      get(persons::marriages).put(marriages::replace_for_person),
    )
    .route("/persons/{id}/tree", get(tree::handler))
    // Marriages
    .route("/marriages", get(marriages::list).post(marriages::create))
    .route(
      "/marriages/{a}/{b}",
      get(marriages::get_one).put(marriages::update).delete(marriages::remove),
    )
    // Parent-child links
    .route("/children", get(children::list).post(children::create))
    .route("/children/{parent}/{child}", delete(children::remove))
    // Events
    .route("/events", get(events::handler))
    .with_state(state)
}

#[cfg(test)]
mod tests;
