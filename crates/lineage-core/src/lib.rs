//! Core types and trait definitions for the Lineage genealogy store.
//!
//! This crate holds the entities (persons, marriages, parent-child links),
//! the query builder used to filter them, the manager and graph traits that
//! storage backends implement, and the tree builder that turns the graph into
//! a rooted, depth-bounded family tree. It has no database or HTTP
//! dependencies.

// Trait impls use native `async fn`; the trait signatures spell out `Send` futures.
#![allow(async_fn_in_trait)]

pub mod child;
pub mod error;
pub mod event;
pub mod graph;
pub mod marriage;
pub mod person;
pub mod query;
pub mod resource;
pub mod store;
pub mod tree;
pub mod view;

pub use error::{Error, InvalidEntity, Result};
pub use person::PersonId;
