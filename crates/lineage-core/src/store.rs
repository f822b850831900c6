//! Entity manager traits.
//!
//! Storage backends (e.g. `lineage-store-sqlite`) implement these once per
//! entity kind. Persons are managed by a [`SingleKeyManager`]; marriages and
//! parent-child links by a [`RelationshipManager`], keyed by a pair of person
//! ids.
//!
//! All methods return `Send` futures so managers can be shared across tasks
//! of a multi-threaded runtime.

use std::future::Future;

use crate::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  error::EntityKind,
  marriage::{Marriage, MarriageColumn},
  person::{Person, PersonColumn},
  query::{Column, Query},
};

// ─── Entities ────────────────────────────────────────────────────────────────

/// A value stored as one row of one table.
pub trait Entity: Clone + Send + Sync + 'static {
  type Column: Column;
  const KIND: EntityKind;
}

/// An entity identified by a pair of person ids.
pub trait PairedEntity: Entity {
  /// The columns holding the two ids, in the order `pair` returns them.
  const PAIR_COLUMNS: (Self::Column, Self::Column);

  fn pair(&self) -> (PersonId, PersonId);

  fn involves(&self, id: PersonId) -> bool {
    let (a, b) = self.pair();
    a == id || b == id
  }
}

impl Entity for Person {
  type Column = PersonColumn;
  const KIND: EntityKind = EntityKind::Person;
}

impl Entity for Marriage {
  type Column = MarriageColumn;
  const KIND: EntityKind = EntityKind::Marriage;
}

impl PairedEntity for Marriage {
  const PAIR_COLUMNS: (MarriageColumn, MarriageColumn) =
    (MarriageColumn::Person1Id, MarriageColumn::Person2Id);

  fn pair(&self) -> (PersonId, PersonId) { self.ids() }
}

impl Entity for ChildRelationship {
  type Column = ChildColumn;
  const KIND: EntityKind = EntityKind::ChildRelationship;
}

impl PairedEntity for ChildRelationship {
  const PAIR_COLUMNS: (ChildColumn, ChildColumn) = (ChildColumn::ParentId, ChildColumn::ChildId);

  fn pair(&self) -> (PersonId, PersonId) { (self.parent_id(), self.child_id()) }
}

// ─── Managers ────────────────────────────────────────────────────────────────

/// Generic CRUD over one entity kind.
pub trait EntityManager<E: Entity>: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert `entity` and return it as stored.
  fn add(&self, entity: E) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Every entity matching `query`. Order is unspecified.
  fn query(
    &self,
    query: Query<E::Column>,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  fn get_all(&self) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_ {
    self.query(Query::all())
  }

  /// Delete every row matching `query`, returning how many were removed.
  fn delete(
    &self,
    query: Query<E::Column>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn count(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

/// A manager whose rows are identified by one key.
pub trait SingleKeyManager<E: Entity>: EntityManager<E> {
  type Key: Copy + Send + Sync + 'static;

  /// Fetch the single row with `key`.
  ///
  /// Fails with `NotFound` when no row matches and `MultipleResults` when
  /// more than one does.
  fn get(&self, key: Self::Key) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Overwrite the row with `key`. Fails with `NotFound` if it does not exist.
  fn update(
    &self,
    key: Self::Key,
    entity: E,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;
}

/// A manager whose rows are identified by a pair of person ids.
pub trait RelationshipManager<E: PairedEntity>: EntityManager<E> {
  /// Fetch the row holding `a` and `b`, in either column order.
  fn get(
    &self,
    a: PersonId,
    b: PersonId,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Replace the row identified by `old` (in either order) with `entity`.
  fn update(
    &self,
    old: (PersonId, PersonId),
    entity: E,
  ) -> impl Future<Output = Result<E, Self::Error>> + Send + '_;

  /// Every row naming `id` on either side.
  fn for_person(&self, id: PersonId) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;

  /// Delete every row naming `id` on either side.
  fn delete_for_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Replace every row naming `id` with `entities`, atomically.
  ///
  /// This is a full replace rather than a diff: callers pass the complete
  /// desired set, including rows that are unchanged. Every entity must
  /// involve `id`.
  fn replace_for_person(
    &self,
    id: PersonId,
    entities: Vec<E>,
  ) -> impl Future<Output = Result<Vec<E>, Self::Error>> + Send + '_;
}
