//! Errors raised by the storage layer
//!
//! Every repository operation returns `Result<T, StorageError>`.
//! Nothing here is retried: a failed query fails the operation.

use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use rusqlite::{ffi, ErrorCode};
use thiserror::Error;

use super::data::ProductId;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A referenced id has no matching row
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: ProductId },

    /// Inserting would duplicate an existing row
    #[error("{entity} {id} already exists")]
    AlreadyExists { entity: &'static str, id: ProductId },

    /// Caller passed a value outside the allowed range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored column could not be decoded into its domain type
    #[error("malformed {column} column in {table}")]
    Malformed {
        table: &'static str,
        column: &'static str,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The database could not be opened or queried
    #[error("storage unavailable")]
    StorageUnavailable(#[source] rusqlite::Error),

    /// The directory holding the database file could not be created
    #[error("could not prepare data directory")]
    DataDirectory(#[source] io::Error),

    /// Neither a data directory nor a home directory is known
    #[error("could not determine user data directory")]
    NoDataDirectory,

    /// The catalog fixture file could not be read
    #[error("could not read catalog seed {}", path.display())]
    SeedFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The catalog fixture is not valid JSON
    #[error("invalid catalog seed")]
    Seed(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn malformed(
        table: &'static str,
        column: &'static str,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Malformed {
            table,
            column,
            source: source.into(),
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(error: rusqlite::Error) -> Self {
        Self::StorageUnavailable(error)
    }
}

/// True when a write collided with a PRIMARY KEY or UNIQUE index
pub(crate) fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == ErrorCode::ConstraintViolation
                && matches!(
                    err.extended_code,
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                )
    )
}

/// True when a write referenced a product that does not exist
pub(crate) fn is_foreign_key_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

/// Convert a pagination bound to the integer type SQLite binds
pub(crate) fn sql_bound(value: usize, name: &str) -> Result<i64, StorageError> {
    i64::try_from(value).map_err(|_| StorageError::invalid(format!("{name} {value} is too large")))
}
