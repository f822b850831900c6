//! Error types for `lineage-core`.

use strum::Display;
use thiserror::Error;

use crate::person::PersonId;

/// The three kinds of stored entity, used to label lookup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Person,
  Marriage,
  ChildRelationship,
}

/// Reasons an entity fails construction-time validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidEntity {
  #[error("id {0} is not positive")]
  NonPositiveId(i64),

  #[error("the name (forename and surname) cannot be blank")]
  BlankName,

  #[error("gender id {0} is out of range (0 = male, 1 = female)")]
  UnknownGender(i64),

  #[error("the date of death cannot be before the date of birth")]
  DeathBeforeBirth,

  #[error("person {0} cannot be married to themselves")]
  SelfMarriage(PersonId),

  #[error("the end of a marriage cannot be before its start")]
  MarriageEndsBeforeStart,

  #[error("person {0} cannot be their own parent")]
  SelfParent(PersonId),

  #[error("cannot change the id of person {from} to {to}")]
  IdChanged { from: PersonId, to: PersonId },

  #[error("relationship {0} does not involve person {1}")]
  NotInvolved(String, PersonId),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid entity: {0}")]
  InvalidEntity(#[from] InvalidEntity),

  #[error("{kind} not found: {key}")]
  NotFound { kind: EntityKind, key: String },

  /// More than one row matched a key that is supposed to be unique.
  #[error("{count} rows of {kind} share the key {key}")]
  MultipleResults {
    kind:  EntityKind,
    key:   String,
    count: usize,
  },
}

impl Error {
  pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
    Self::NotFound { kind, key: key.to_string() }
  }

  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound { .. }) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
