//! Error type for `lineage-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] lineage_core::Error),

  /// A statement failed inside SQLite. Carries the SQL text for diagnostics.
  #[error("store failure executing `{query}`: {source}")]
  Store {
    query:  String,
    #[source]
    source: tokio_rusqlite::Error,
  },

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),
}

impl From<lineage_core::InvalidEntity> for Error {
  fn from(e: lineage_core::InvalidEntity) -> Self { Self::Core(e.into()) }
}

impl Error {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_not_found())
  }

  /// A uniqueness or check constraint rejected the write, e.g. a second
  /// marriage row for the same pair.
  pub fn is_constraint_violation(&self) -> bool {
    let (Self::Store { source, .. } | Self::Database(source)) = self else { return false };
    matches!(
      source,
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
        if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
