//! [`SqliteStore`]: the three managers over one connection, plus the graph
//! accessor and read snapshots.

use std::{path::Path, sync::Arc};

use lineage_core::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  event::{Event, collect_events},
  graph::{GenealogyGraph, GraphSnapshot},
  marriage::Marriage,
  person::{Person, PersonColumn},
  query::{Filter, JoinType, Query},
  resource::AvatarStore,
  store::{EntityManager, RelationshipManager, SingleKeyManager},
};
use tracing::{debug, warn};

use crate::{
  Result,
  manager::{ChildrenManager, DeleteOutcome, Manager, MarriageManager, PersonManager},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A genealogy store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  avatars: Option<Arc<dyn AvatarStore>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, avatars: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, avatars: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store after running `ddl`, which may pre-create tables
  /// with looser constraints than the real schema.
  #[cfg(test)]
  pub(crate) async fn open_in_memory_with(ddl: &'static str) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    conn
      .call(move |conn| {
        conn.execute_batch(ddl)?;
        Ok(())
      })
      .await?;
    let store = Self { conn, avatars: None };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Remove avatars from `avatars` when a person is deleted.
  pub fn with_avatars(mut self, avatars: Arc<dyn AvatarStore>) -> Self {
    self.avatars = Some(avatars);
    self
  }

  pub fn persons(&self) -> PersonManager { Manager::new(self.conn.clone()) }

  pub fn marriages(&self) -> MarriageManager { Manager::new(self.conn.clone()) }

  pub fn children(&self) -> ChildrenManager { Manager::new(self.conn.clone()) }

  pub async fn next_available_id(&self) -> Result<PersonId> {
    self.persons().next_available_id().await
  }

  /// Delete a person with every relationship naming them and their avatar.
  pub async fn delete_person(&self, id: PersonId) -> Result<DeleteOutcome> {
    self.persons().delete_with_references(id, self.avatars.as_deref()).await
  }

  /// Replace every marriage of `id` with `marriages`.
  pub async fn update_marriages(
    &self,
    id: PersonId,
    marriages: Vec<Marriage>,
  ) -> Result<Vec<Marriage>> {
    self.marriages().replace_for_person(id, marriages).await
  }

  /// Replace every parent-child link naming `id` with `links`, including
  /// the links where `id` is the child.
  pub async fn update_children(
    &self,
    id: PersonId,
    links: Vec<ChildRelationship>,
  ) -> Result<Vec<ChildRelationship>> {
    self.children().replace_for_person(id, links).await
  }

  /// Birthdays and anniversaries, ordered through the calendar year.
  pub async fn events(&self) -> Result<Vec<Event>> {
    let people = self.persons().get_all().await?;
    let marriages = self.marriages().get_all().await?;
    Ok(collect_events(&people, &marriages))
  }

  /// Copy all three tables inside one read transaction.
  pub async fn snapshot(&self) -> Result<GraphSnapshot> {
    let (persons, marriages, children) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let persons = PersonManager::read_raw(&tx, &PersonManager::select_sql("1"), vec![])?;
        let marriages =
          MarriageManager::read_raw(&tx, &MarriageManager::select_sql("1"), vec![])?;
        let children =
          ChildrenManager::read_raw(&tx, &ChildrenManager::select_sql("1"), vec![])?;
        tx.commit()?;
        Ok((persons, marriages, children))
      })
      .await?;

    let persons = PersonManager::decode_all(persons)?;
    let marriages = MarriageManager::decode_all(marriages)?;
    let children = ChildrenManager::decode_all(children)?;
    debug!(
      persons = persons.len(),
      marriages = marriages.len(),
      children = children.len(),
      "loaded graph snapshot"
    );
    Ok(GraphSnapshot::new(persons, marriages, children))
  }

  /// Load the persons with `ids`, skipping (and logging) any that are missing.
  async fn resolve(&self, ids: Vec<PersonId>) -> Result<Vec<Person>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let query = ids
      .iter()
      .fold(Query::builder(), |b, &id| b.add_filter(Filter::equal(PersonColumn::Id, id)))
      .build(JoinType::Or);
    let found = self.persons().query(query).await?;
    for id in &ids {
      if !found.iter().any(|p| p.id() == *id) {
        warn!(person_id = %id, "relationship names a missing person; skipping");
      }
    }
    Ok(found)
  }
}

// ─── Graph accessor ──────────────────────────────────────────────────────────

impl GenealogyGraph for SqliteStore {
  type Error = crate::Error;

  async fn person(&self, id: PersonId) -> Result<Option<Person>> {
    match self.persons().get(id).await {
      Ok(p) => Ok(Some(p)),
      Err(e) if e.is_not_found() => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn marriages_of(&self, id: PersonId) -> Result<Vec<Marriage>> {
    self.marriages().for_person(id).await
  }

  async fn spouses_of(&self, id: PersonId) -> Result<Vec<Person>> {
    let ids = self.marriages_of(id).await?.iter().map(|m| m.other_spouse_id(id)).collect();
    self.resolve(ids).await
  }

  async fn parents_of(&self, id: PersonId) -> Result<Vec<Person>> {
    let links = self
      .children()
      .query(Query::single(Filter::equal(ChildColumn::ChildId, id)))
      .await?;
    self.resolve(links.iter().map(ChildRelationship::parent_id).collect()).await
  }

  async fn children_of(&self, id: PersonId) -> Result<Vec<Person>> {
    let links = self
      .children()
      .query(Query::single(Filter::equal(ChildColumn::ParentId, id)))
      .await?;
    self.resolve(links.iter().map(ChildRelationship::child_id).collect()).await
  }
}

impl std::fmt::Debug for SqliteStore {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SqliteStore").field("avatars", &self.avatars.is_some()).finish()
  }
}

