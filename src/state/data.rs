/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.

use std::fmt;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Identity of a catalog product, assigned by the catalog fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl ToSql for ProductId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for ProductId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// Represents a single product in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique database ID
    pub id: ProductId,
    /// Display name, never empty
    pub name: String,
    /// Where the product image is loaded from
    pub image_url: String,
    /// Price in the smallest currency unit
    pub price: u64,
}

/// A product as it appears in the catalog fixture, before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub id: ProductId,
    pub name: String,
    pub image_url: String,
    pub price: u64,
}

impl NewProduct {
    /// Reject products the catalog cannot hold
    pub fn validate(&self) -> Result<(), StorageError> {
        if self.name.trim().is_empty() {
            return Err(StorageError::invalid(format!(
                "product {} has an empty name",
                self.id
            )));
        }
        if i64::try_from(self.price).is_err() {
            return Err(StorageError::invalid(format!(
                "product {} price {} does not fit in storage",
                self.id, self.price
            )));
        }
        Ok(())
    }
}

impl From<NewProduct> for Product {
    fn from(product: NewProduct) -> Self {
        Self {
            id: product.id,
            name: product.name,
            image_url: product.image_url,
            price: product.price,
        }
    }
}

/// A raw row of the `cart_entries` table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
    pub product_id: ProductId,
    /// Always at least 1; removal means "not in cart"
    pub count: u32,
    pub is_selected: bool,
}

/// A cart entry with its product resolved, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartProduct {
    pub product: Product,
    pub count: u32,
    pub is_selected: bool,
}

impl CartProduct {
    /// Line total for this entry (price times quantity)
    pub fn total_price(&self) -> u64 {
        self.product.price.saturating_mul(u64::from(self.count))
    }
}

/// Result of seeding the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}
