//! [`Manager`]: generic CRUD over one table, plus the single-key (persons)
//! and relationship (marriages, children) capabilities.

use std::marker::PhantomData;

use lineage_core::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  error::{EntityKind, InvalidEntity},
  marriage::{Marriage, MarriageColumn},
  person::{Person, PersonColumn},
  query::{Column, Filter, Query},
  resource::{AvatarStore, ResourceError},
  store::{EntityManager, PairedEntity, RelationshipManager, SingleKeyManager},
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value as SqlValue};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  compile::{Compiled, compile},
  encode::Table,
};

pub type PersonManager = Manager<Person>;
pub type MarriageManager = Manager<Marriage>;
pub type ChildrenManager = Manager<ChildRelationship>;

// ─── Generic manager ─────────────────────────────────────────────────────────

/// CRUD over the table holding `E`.
///
/// Cloning is cheap; every manager shares the store's connection.
pub struct Manager<E> {
  conn:    tokio_rusqlite::Connection,
  _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Manager<E> {
  fn clone(&self) -> Self { Self { conn: self.conn.clone(), _entity: PhantomData } }
}

impl<E: Table> Manager<E> {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self {
    Self { conn, _entity: PhantomData }
  }

  fn column_list() -> String {
    E::COLUMNS.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
  }

  pub(crate) fn select_sql(clause: &str) -> String {
    format!("SELECT {} FROM {} WHERE {clause}", Self::column_list(), E::TABLE)
  }

  fn insert_sql() -> String {
    let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
    format!("INSERT INTO {} ({}) VALUES ({placeholders})", E::TABLE, Self::column_list())
  }

  fn delete_sql(clause: &str) -> String { format!("DELETE FROM {} WHERE {clause}", E::TABLE) }

  /// Run `f` on the database thread. A failure is reported together with
  /// `sql`, the statement text being executed.
  async fn call<R, F>(&self, sql: String, f: F) -> Result<R>
  where
    R: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection, &str) -> rusqlite::Result<R> + Send + 'static,
  {
    let query = sql.clone();
    self
      .conn
      .call(move |conn| Ok(f(conn, &sql)?))
      .await
      .map_err(|source| Error::Store { query, source })
  }

  /// Select raw rows; runs on the database thread.
  pub(crate) fn read_raw(
    conn: &rusqlite::Connection,
    sql: &str,
    params: Vec<SqlValue>,
  ) -> rusqlite::Result<Vec<E::Raw>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
      .query_map(params_from_iter(params), |row| E::read_row(row))?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub(crate) fn decode_all(raws: Vec<E::Raw>) -> Result<Vec<E>> {
    raws.into_iter().map(E::decode).collect()
  }

  /// Fetch the single row matching `query`, failing on zero or many.
  async fn unique(&self, query: Query<E::Column>, key: String) -> Result<E> {
    let mut found = self.query(query).await?;
    match found.len() {
      0 => Err(lineage_core::Error::not_found(E::KIND, key).into()),
      1 => Ok(found.remove(0)),
      count => Err(lineage_core::Error::MultipleResults { kind: E::KIND, key, count }.into()),
    }
  }
}

impl<E: Table> EntityManager<E> for Manager<E> {
  type Error = Error;

  async fn add(&self, entity: E) -> Result<E> {
    let values = entity.encode();
    self
      .call(Self::insert_sql(), move |conn, sql| conn.execute(sql, params_from_iter(values)))
      .await?;
    debug!(kind = %E::KIND, "added row");
    Ok(entity)
  }

  async fn query(&self, query: Query<E::Column>) -> Result<Vec<E>> {
    let Compiled { clause, params } = compile(&query);
    let raws = self
      .call(Self::select_sql(&clause), move |conn, sql| Self::read_raw(conn, sql, params))
      .await?;
    Self::decode_all(raws)
  }

  async fn delete(&self, query: Query<E::Column>) -> Result<usize> {
    let Compiled { clause, params } = compile(&query);
    let removed = self
      .call(Self::delete_sql(&clause), move |conn, sql| {
        conn.execute(sql, params_from_iter(params))
      })
      .await?;
    debug!(kind = %E::KIND, removed, "deleted rows");
    Ok(removed)
  }

  async fn count(&self) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
    let n: i64 = self.call(sql, |conn, sql| conn.query_row(sql, [], |r| r.get(0))).await?;
    Ok(n as usize)
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

/// What a cascading person delete removed.
#[derive(Debug)]
pub struct DeleteOutcome {
  pub marriages_removed: usize,
  pub children_removed:  usize,
  /// Set when the avatar could not be removed for a reason other than it not
  /// existing. The database rows are gone regardless.
  pub avatar_failure:    Option<ResourceError>,
}

impl SingleKeyManager<Person> for Manager<Person> {
  type Key = PersonId;

  async fn get(&self, id: PersonId) -> Result<Person> {
    self.unique(Query::single(Filter::equal(PersonColumn::Id, id)), id.to_string()).await
  }

  async fn update(&self, id: PersonId, person: Person) -> Result<Person> {
    if person.id() != id {
      return Err(InvalidEntity::IdChanged { from: id, to: person.id() }.into());
    }

    let assignments = Person::COLUMNS
      .iter()
      .map(|c| format!("{} = ?", c.name()))
      .collect::<Vec<_>>()
      .join(", ");
    let sql = format!("UPDATE {} SET {assignments} WHERE id = ?", Person::TABLE);
    let mut values = person.encode();
    values.push(SqlValue::Integer(id.get()));

    let changed = self
      .call(sql, move |conn, sql| conn.execute(sql, params_from_iter(values)))
      .await?;
    if changed == 0 {
      return Err(lineage_core::Error::not_found(EntityKind::Person, id).into());
    }
    debug!(person_id = %id, "updated person");
    Ok(person)
  }
}

impl Manager<Person> {
  /// The id the next inserted person will receive from the auto-increment
  /// counter, so it can be referenced before the person is written.
  pub async fn next_available_id(&self) -> Result<PersonId> {
    let sql = "SELECT seq FROM sqlite_sequence WHERE name = ?1".to_owned();
    let highest: Option<i64> = self
      .call(sql, |conn, sql| {
        conn.query_row(sql, [Person::TABLE], |r| r.get(0)).optional()
      })
      .await?;
    let next = PersonId::new(highest.unwrap_or(0) + 1)?;
    debug!(next_id = %next, "next available person id");
    Ok(next)
  }

  /// Delete the person with `id` together with every marriage and
  /// parent-child row naming them, then remove their avatar.
  ///
  /// The rows go in one transaction. The other party of each relationship is
  /// left untouched. Avatar removal happens after commit; a missing avatar is
  /// ignored and any other failure is logged and reported in the outcome.
  pub async fn delete_with_references(
    &self,
    id: PersonId,
    avatars: Option<&dyn AvatarStore>,
  ) -> Result<DeleteOutcome> {
    let marriages = compile(&Query::either(
      MarriageColumn::Person1Id,
      MarriageColumn::Person2Id,
      id,
    ));
    let children = compile(&Query::either(ChildColumn::ParentId, ChildColumn::ChildId, id));
    let person = compile(&Query::single(Filter::equal(PersonColumn::Id, id)));

    let statements = [
      (Manager::<Marriage>::delete_sql(&marriages.clause), marriages.params),
      (Manager::<ChildRelationship>::delete_sql(&children.clause), children.params),
      (Self::delete_sql(&person.clause), person.params),
    ];
    let sql = statements.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>().join("; ");

    let counts = self
      .call(sql, move |conn, _| {
        let tx = conn.transaction()?;
        let mut counts = [0usize; 3];
        for (count, (sql, params)) in counts.iter_mut().zip(statements) {
          *count = tx.execute(&sql, params_from_iter(params))?;
        }
        // Dropping the transaction without commit rolls it back.
        if counts[2] > 0 {
          tx.commit()?;
        }
        Ok(counts)
      })
      .await?;

    let [marriages_removed, children_removed, persons_removed] = counts;
    if persons_removed == 0 {
      return Err(lineage_core::Error::not_found(EntityKind::Person, id).into());
    }
    info!(person_id = %id, marriages_removed, children_removed, "deleted person");

    let avatar_failure = match avatars.map(|a| a.remove(id)) {
      None | Some(Ok(())) => None,
      Some(Err(ResourceError::NotFound(_))) => {
        debug!(person_id = %id, "no avatar to remove");
        None
      }
      Some(Err(e)) => {
        warn!(person_id = %id, error = %e, "failed to remove avatar");
        Some(e)
      }
    };

    Ok(DeleteOutcome { marriages_removed, children_removed, avatar_failure })
  }
}

// ─── Relationships ───────────────────────────────────────────────────────────

fn pair_key(a: PersonId, b: PersonId) -> String { format!("({a}, {b})") }

impl<E: Table + PairedEntity> RelationshipManager<E> for Manager<E> {
  async fn get(&self, a: PersonId, b: PersonId) -> Result<E> {
    let (c1, c2) = E::PAIR_COLUMNS;
    self.unique(Query::pair(c1, c2, a, b), pair_key(a, b)).await
  }

  async fn update(&self, (a, b): (PersonId, PersonId), entity: E) -> Result<E> {
    let (c1, c2) = E::PAIR_COLUMNS;
    let old = compile(&Query::pair(c1, c2, a, b));
    let delete = Self::delete_sql(&old.clause);
    let values = entity.encode();
    let sql = format!("{delete}; {}", Self::insert_sql());

    let replaced = self
      .call(sql, move |conn, _| {
        let tx = conn.transaction()?;
        let removed = tx.execute(&delete, params_from_iter(old.params))?;
        if removed == 0 {
          return Ok(false);
        }
        tx.execute(&Self::insert_sql(), params_from_iter(values))?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !replaced {
      return Err(lineage_core::Error::not_found(E::KIND, pair_key(a, b)).into());
    }
    debug!(kind = %E::KIND, old = %pair_key(a, b), "updated relationship");
    Ok(entity)
  }

  async fn for_person(&self, id: PersonId) -> Result<Vec<E>> {
    let (c1, c2) = E::PAIR_COLUMNS;
    self.query(Query::either(c1, c2, id)).await
  }

  async fn delete_for_person(&self, id: PersonId) -> Result<usize> {
    let (c1, c2) = E::PAIR_COLUMNS;
    self.delete(Query::either(c1, c2, id)).await
  }

  async fn replace_for_person(&self, id: PersonId, entities: Vec<E>) -> Result<Vec<E>> {
    if let Some(stray) = entities.iter().find(|e| !e.involves(id)) {
      let (a, b) = stray.pair();
      return Err(InvalidEntity::NotInvolved(pair_key(a, b), id).into());
    }

    let (c1, c2) = E::PAIR_COLUMNS;
    let existing = compile(&Query::either(c1, c2, id));
    let delete = Self::delete_sql(&existing.clause);
    let rows: Vec<Vec<SqlValue>> = entities.iter().map(Table::encode).collect();
    let sql = format!("{delete}; {}", Self::insert_sql());

    let (removed, inserted) = self
      .call(sql, move |conn, _| {
        let tx = conn.transaction()?;
        let removed = tx.execute(&delete, params_from_iter(existing.params))?;
        let insert = Self::insert_sql();
        for values in &rows {
          tx.execute(&insert, params_from_iter(values))?;
        }
        tx.commit()?;
        Ok((removed, rows.len()))
      })
      .await?;

    info!(kind = %E::KIND, person_id = %id, removed, inserted, "replaced relationships");
    Ok(entities)
  }
}
