/// Catalog fixture loaded at first run
///
/// The catalog ships as JSON. It is parsed with serde and written into the
/// `products` table; products whose id is already stored are skipped, so
/// seeding an existing database is harmless.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::data::NewProduct;
use super::error::StorageError;

/// The catalog compiled into the binary
const BUNDLED_CATALOG: &str = include_str!("../../assets/catalog.json");

/// A list of products to seed the catalog with
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CatalogSeed {
    pub products: Vec<NewProduct>,
}

impl CatalogSeed {
    /// The default catalog bundled with the crate
    pub fn bundled() -> Result<Self, StorageError> {
        Self::from_json(BUNDLED_CATALOG)
    }

    /// Read a catalog fixture from disk
    pub fn from_file(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|source| StorageError::SeedFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
