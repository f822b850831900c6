//! SQLite backend for the Lineage genealogy store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod compile;
mod encode;
mod manager;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use manager::{ChildrenManager, DeleteOutcome, Manager, MarriageManager, PersonManager};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
