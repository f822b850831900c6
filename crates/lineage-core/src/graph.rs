//! Graph-shaped questions over the three relation sets.
//!
//! [`GenealogyGraph`] is implemented by storage backends, answering each
//! question with live queries, and by [`GraphSnapshot`], an in-memory copy of
//! all three tables taken at one point in time.
//!
//! Relationship rows that name a person who does not exist are skipped with a
//! warning rather than reported as errors.

use std::{collections::BTreeMap, future::Future};

use tracing::warn;

use crate::{
  Error, PersonId, Result,
  child::ChildRelationship,
  marriage::Marriage,
  person::Person,
};

/// Read-only projections of the genealogy graph. None of these mutate state,
/// and an empty result is an empty vector, not an error.
pub trait GenealogyGraph: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Marriages (former and current) involving `id`.
  fn marriages_of(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Vec<Marriage>, Self::Error>> + Send + '_;

  /// Spouses (former and current) of `id`.
  fn spouses_of(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn parents_of(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn children_of(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// An immutable in-memory copy of the persons, marriages and children tables.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
  persons:   BTreeMap<PersonId, Person>,
  marriages: Vec<Marriage>,
  children:  Vec<ChildRelationship>,
}

impl GraphSnapshot {
  pub fn new(
    persons: impl IntoIterator<Item = Person>,
    marriages: Vec<Marriage>,
    children: Vec<ChildRelationship>,
  ) -> Self {
    Self {
      persons: persons.into_iter().map(|p| (p.id(), p)).collect(),
      marriages,
      children,
    }
  }

  pub fn persons(&self) -> impl Iterator<Item = &Person> { self.persons.values() }

  pub fn marriages(&self) -> &[Marriage] { &self.marriages }

  pub fn children(&self) -> &[ChildRelationship] { &self.children }

  /// Look up a person that must exist.
  pub fn require(&self, id: PersonId) -> Result<&Person> {
    self
      .persons
      .get(&id)
      .ok_or_else(|| Error::not_found(crate::error::EntityKind::Person, id))
  }

  fn resolve(&self, ids: impl Iterator<Item = PersonId>) -> Vec<Person> {
    ids
      .filter_map(|id| {
        let found = self.persons.get(&id).cloned();
        if found.is_none() {
          warn!(person_id = %id, "relationship names a missing person; skipping");
        }
        found
      })
      .collect()
  }

  fn spouse_ids(&self, id: PersonId) -> impl Iterator<Item = PersonId> + '_ {
    self
      .marriages
      .iter()
      .filter(move |m| m.involves(id))
      .map(move |m| m.other_spouse_id(id))
  }
}

impl GenealogyGraph for GraphSnapshot {
  type Error = Error;

  async fn person(&self, id: PersonId) -> Result<Option<Person>> {
    Ok(self.persons.get(&id).cloned())
  }

  async fn marriages_of(&self, id: PersonId) -> Result<Vec<Marriage>> {
    Ok(self.marriages.iter().filter(|m| m.involves(id)).cloned().collect())
  }

  async fn spouses_of(&self, id: PersonId) -> Result<Vec<Person>> {
    Ok(self.resolve(self.spouse_ids(id)))
  }

  async fn parents_of(&self, id: PersonId) -> Result<Vec<Person>> {
    let ids = self
      .children
      .iter()
      .filter(|c| c.child_id() == id)
      .map(ChildRelationship::parent_id);
    Ok(self.resolve(ids))
  }

  async fn children_of(&self, id: PersonId) -> Result<Vec<Person>> {
    let ids = self
      .children
      .iter()
      .filter(|c| c.parent_id() == id)
      .map(ChildRelationship::child_id);
    Ok(self.resolve(ids))
  }
}
