//! Errors raised by record store adapters

use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Driver, connection or I/O failure. Not retried by the store.
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("field '{field}' holds a value the store cannot persist")]
    UnsupportedValue { field: String },

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },
}
