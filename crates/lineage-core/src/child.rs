//! ChildRelationship: an ordered (parent, child) pair.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{InvalidEntity, PersonId, Result, query::Column};

/// Columns of the `children` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ChildColumn {
  ParentId,
  ChildId,
}

impl Column for ChildColumn {
  fn name(self) -> &'static str { self.into() }
}

/// Records that `parent_id` is a parent of `child_id`. A child may have any
/// number of parents and a parent any number of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ChildRecord")]
pub struct ChildRelationship {
  parent_id: PersonId,
  child_id:  PersonId,
}

#[derive(Deserialize)]
struct ChildRecord {
  parent_id: i64,
  child_id:  i64,
}

impl TryFrom<ChildRecord> for ChildRelationship {
  type Error = InvalidEntity;

  fn try_from(r: ChildRecord) -> Result<Self, InvalidEntity> {
    ChildRelationship::new(PersonId::new(r.parent_id)?, PersonId::new(r.child_id)?)
  }
}

impl ChildRelationship {
  pub fn new(parent_id: PersonId, child_id: PersonId) -> Result<Self, InvalidEntity> {
    if parent_id == child_id {
      return Err(InvalidEntity::SelfParent(parent_id));
    }
    Ok(Self { parent_id, child_id })
  }

  pub fn parent_id(&self) -> PersonId { self.parent_id }

  pub fn child_id(&self) -> PersonId { self.child_id }
}
