//! Runtime configuration.

use std::path::PathBuf;

use crate::feed::DEFAULT_BATCH_SIZE;
use crate::pager::DEFAULT_CART_PAGE_SIZE;
use crate::state::database::Database;
use crate::state::error::StorageError;

/// Default log filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding the catalog, cart and recency list
    pub db_path: PathBuf,
    /// Products fetched per "load more"
    pub product_batch_size: usize,
    /// Cart entries per page
    pub cart_page_size: usize,
    pub log_level: String,
}

impl Config {
    /// Defaults, with the database in the platform data directory
    pub fn new() -> Result<Self, StorageError> {
        Ok(Self::with_db_path(Database::default_path()?))
    }

    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            product_batch_size: DEFAULT_BATCH_SIZE,
            cart_page_size: DEFAULT_CART_PAGE_SIZE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
