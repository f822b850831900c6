//! Predicate and query builder.
//!
//! A [`Query`] is a list of predicates over one entity's columns, all joined
//! by the same [`JoinType`]. A predicate is either a leaf (`column = value`)
//! or another query, which is how AND and OR are mixed:
//!
//! ```
//! # use lineage_core::{PersonId, child::ChildColumn, query::{Filter, JoinType, Query}};
//! let (a, b) = (PersonId::new(1).unwrap(), PersonId::new(2).unwrap());
//! let either_order = Query::builder()
//!   .add_query(Query::builder()
//!     .add_filter(Filter::equal(ChildColumn::ParentId, a))
//!     .add_filter(Filter::equal(ChildColumn::ChildId, b))
//!     .build(JoinType::And))
//!   .add_query(Query::builder()
//!     .add_filter(Filter::equal(ChildColumn::ParentId, b))
//!     .add_filter(Filter::equal(ChildColumn::ChildId, a))
//!     .build(JoinType::And))
//!   .build(JoinType::Or);
//! assert_eq!(either_order.predicates().len(), 2);
//! ```
//!
//! Compiling a query into store-native form is the backend's job; an empty
//! query always means "every row".

use crate::PersonId;

/// A column of one entity's table.
pub trait Column: Copy + Send + Sync + 'static {
  fn name(self) -> &'static str;
}

/// A value compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
  Integer(i64),
  Text(String),
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<PersonId> for Value {
  fn from(id: PersonId) -> Self { Self::Integer(id.get()) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Self::Text(v) }
}

/// A leaf predicate: `column = value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<C> {
  pub column: C,
  pub value:  Value,
}

impl<C: Column> Filter<C> {
  pub fn equal(column: C, value: impl Into<Value>) -> Self {
    Self { column, value: value.into() }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
  #[default]
  And,
  Or,
}

impl JoinType {
  pub fn keyword(self) -> &'static str {
    match self {
      Self::And => "AND",
      Self::Or => "OR",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate<C> {
  Filter(Filter<C>),
  Query(Query<C>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<C> {
  predicates: Vec<Predicate<C>>,
  join:       JoinType,
}

impl<C: Column> Query<C> {
  /// Matches every row.
  pub fn all() -> Self { Self { predicates: Vec::new(), join: JoinType::And } }

  pub fn single(filter: Filter<C>) -> Self {
    Self { predicates: vec![Predicate::Filter(filter)], join: JoinType::And }
  }

  pub fn builder() -> QueryBuilder<C> { QueryBuilder { predicates: Vec::new() } }

  /// Rows where either column equals `id`.
  pub fn either(a: C, b: C, id: PersonId) -> Self {
    Self::builder()
      .add_filter(Filter::equal(a, id))
      .add_filter(Filter::equal(b, id))
      .build(JoinType::Or)
  }

  /// Rows holding the pair `(x, y)` in either column order.
  pub fn pair(a: C, b: C, x: PersonId, y: PersonId) -> Self {
    let ordered = |first: PersonId, second: PersonId| {
      Self::builder()
        .add_filter(Filter::equal(a, first))
        .add_filter(Filter::equal(b, second))
        .build(JoinType::And)
    };
    Self::builder()
      .add_query(ordered(x, y))
      .add_query(ordered(y, x))
      .build(JoinType::Or)
  }

  pub fn predicates(&self) -> &[Predicate<C>] { &self.predicates }

  pub fn join(&self) -> JoinType { self.join }

  pub fn is_empty(&self) -> bool { self.predicates.is_empty() }
}

#[derive(Debug, Clone)]
pub struct QueryBuilder<C> {
  predicates: Vec<Predicate<C>>,
}

impl<C: Column> QueryBuilder<C> {
  pub fn add_filter(mut self, filter: Filter<C>) -> Self {
    self.predicates.push(Predicate::Filter(filter));
    self
  }

  pub fn add_query(mut self, query: Query<C>) -> Self {
    self.predicates.push(Predicate::Query(query));
    self
  }

  pub fn build(self, join: JoinType) -> Query<C> {
    Query { predicates: self.predicates, join }
  }
}
