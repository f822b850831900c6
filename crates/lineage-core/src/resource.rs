//! Out-of-band resources keyed by person id (avatars).
//!
//! Deleting a person asks the [`AvatarStore`] to remove that person's avatar.
//! The store is a collaborator, not part of the database: a failure here is
//! reported to the caller of the cascade but never undoes the delete.

use std::{
  io,
  path::{Path, PathBuf},
};

use thiserror::Error;

use crate::PersonId;

#[derive(Debug, Error)]
pub enum ResourceError {
  #[error("no avatar stored for person {0}")]
  NotFound(PersonId),

  #[error("failed to remove {path}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
}

pub trait AvatarStore: Send + Sync {
  fn remove(&self, id: PersonId) -> Result<(), ResourceError>;
}

/// Avatars kept as `person_<id>.png` files in one directory.
#[derive(Debug, Clone)]
pub struct AvatarDirectory {
  root: PathBuf,
}

impl AvatarDirectory {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  pub fn path_for(&self, id: PersonId) -> PathBuf {
    self.root.join(format!("person_{id}.png"))
  }
}

impl AvatarStore for AvatarDirectory {
  fn remove(&self, id: PersonId) -> Result<(), ResourceError> {
    let path = self.path_for(id);
    std::fs::remove_file(&path).map_err(|source| match source.kind() {
      io::ErrorKind::NotFound => ResourceError::NotFound(id),
      _ => ResourceError::Io { path, source },
    })
  }
}
