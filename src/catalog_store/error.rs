//! Error taxonomy for the catalog store.

use thiserror::Error;

/// Errors surfaced by catalog store operations.
///
/// `NotFound` covers every lookup-by-id failure, including publisher and
/// author references inside a book write. Uniqueness violations (duplicate
/// author or publisher names) come through `Sqlite` untranslated.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
