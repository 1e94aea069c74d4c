//! Product store: the `products` table.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::data::{NewProduct, Product, ProductId};
use super::database::column;
use super::error::{is_unique_violation, sql_bound, StorageError};

const TABLE: &str = "products";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ProductStore;

impl ProductStore {
    /// Insert a catalog product with its explicit id
    pub(crate) fn insert(&self, conn: &Connection, product: &NewProduct) -> Result<(), StorageError> {
        product.validate()?;
        let price = sql_bound_price(product.price)?;

        conn.execute(
            "INSERT INTO products (id, name, image_url, price) VALUES (?1, ?2, ?3, ?4)",
            params![product.id, product.name, product.image_url, price],
        )
        .map_err(|err| {
            if is_unique_violation(&err) {
                StorageError::AlreadyExists {
                    entity: "product",
                    id: product.id,
                }
            } else {
                StorageError::from(err)
            }
        })?;

        debug!(product_id = %product.id, "inserted product");
        Ok(())
    }

    /// Up to `count` products starting at offset `from`, in insertion order
    pub(crate) fn list(
        &self,
        conn: &Connection,
        from: usize,
        count: usize,
    ) -> Result<Vec<Product>, StorageError> {
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, image_url, price FROM products ORDER BY seq LIMIT ?1 OFFSET ?2",
        )?;

        let mut rows = stmt.query(params![sql_bound(count, "count")?, sql_bound(from, "from")?])?;

        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(decode(row)?);
        }

        Ok(products)
    }

    pub(crate) fn get(&self, conn: &Connection, id: ProductId) -> Result<Product, StorageError> {
        let mut stmt =
            conn.prepare_cached("SELECT id, name, image_url, price FROM products WHERE id = ?1")?;

        let mut rows = stmt.query([id])?;
        let product = match rows.next()? {
            Some(row) => decode(row)?,
            None => {
                return Err(StorageError::NotFound {
                    entity: "product",
                    id,
                })
            }
        };

        Ok(product)
    }

    pub(crate) fn exists(&self, conn: &Connection, id: ProductId) -> Result<bool, StorageError> {
        let found = conn
            .query_row("SELECT 1 FROM products WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub(crate) fn count(&self, conn: &Connection) -> Result<usize, StorageError> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|err| StorageError::malformed(TABLE, "COUNT(*)", err))
    }
}

fn sql_bound_price(price: u64) -> Result<i64, StorageError> {
    i64::try_from(price).map_err(|_| StorageError::invalid(format!("price {price} is too large")))
}

/// Decode one `products` row, rejecting empty names and negative prices
fn decode(row: &Row<'_>) -> Result<Product, StorageError> {
    let name: String = column(row, TABLE, "name")?;
    if name.trim().is_empty() {
        return Err(StorageError::malformed(TABLE, "name", "product name is empty"));
    }

    let price: i64 = column(row, TABLE, "price")?;
    let price = u64::try_from(price).map_err(|err| StorageError::malformed(TABLE, "price", err))?;

    Ok(Product {
        id: column(row, TABLE, "id")?,
        name,
        image_url: column(row, TABLE, "image_url")?,
        price,
    })
}
