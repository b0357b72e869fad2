use thiserror::Error;

use crate::validation::FieldErrors;

/// Errors returned by [`Store`](crate::Store) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Submitted data failed field constraints.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    /// The database rejected or failed a query.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// Applying the schema failed.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns `true` if this is a [`StoreError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type alias for store operations.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;
