//! Cart store: the `cart_entries` table.
//!
//! Rows here only carry a product id; resolving it into a [`Product`] is
//! the repository's job.
//!
//! [`Product`]: super::data::Product

use rusqlite::{params, Connection, Row};
use tracing::debug;

use super::data::{CartEntry, ProductId};
use super::database::column;
use super::error::{is_foreign_key_violation, is_unique_violation, sql_bound, StorageError};

const TABLE: &str = "cart_entries";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CartStore;

impl CartStore {
    /// Insert a new entry. A second row for the same product is refused.
    pub(crate) fn insert(&self, conn: &Connection, entry: CartEntry) -> Result<(), StorageError> {
        ensure_positive(entry.count)?;

        conn.execute(
            "INSERT INTO cart_entries (product_id, count, is_selected) VALUES (?1, ?2, ?3)",
            params![entry.product_id, entry.count, entry.is_selected],
        )
        .map_err(|err| {
            if is_unique_violation(&err) {
                StorageError::AlreadyExists {
                    entity: "cart entry",
                    id: entry.product_id,
                }
            } else if is_foreign_key_violation(&err) {
                StorageError::NotFound {
                    entity: "product",
                    id: entry.product_id,
                }
            } else {
                StorageError::from(err)
            }
        })?;

        debug!(product_id = %entry.product_id, count = entry.count, "inserted cart entry");
        Ok(())
    }

    pub(crate) fn list(
        &self,
        conn: &Connection,
        from: usize,
        count: usize,
    ) -> Result<Vec<CartEntry>, StorageError> {
        let mut stmt = conn.prepare_cached(
            "SELECT product_id, count, is_selected FROM cart_entries
             ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )?;

        let mut rows = stmt.query(params![sql_bound(count, "count")?, sql_bound(from, "from")?])?;
        collect(&mut rows)
    }

    pub(crate) fn list_selected(&self, conn: &Connection) -> Result<Vec<CartEntry>, StorageError> {
        let mut stmt = conn.prepare_cached(
            "SELECT product_id, count, is_selected FROM cart_entries
             WHERE is_selected = 1 ORDER BY rowid",
        )?;

        let mut rows = stmt.query([])?;
        collect(&mut rows)
    }

    pub(crate) fn get(&self, conn: &Connection, id: ProductId) -> Result<CartEntry, StorageError> {
        let mut stmt = conn.prepare_cached(
            "SELECT product_id, count, is_selected FROM cart_entries WHERE product_id = ?1",
        )?;

        let mut rows = stmt.query([id])?;
        let entry = match rows.next()? {
            Some(row) => decode(row)?,
            None => {
                return Err(StorageError::NotFound {
                    entity: "cart entry",
                    id,
                })
            }
        };

        Ok(entry)
    }

    pub(crate) fn count(&self, conn: &Connection) -> Result<usize, StorageError> {
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM cart_entries", [], |row| row.get(0))?;
        usize::try_from(count).map_err(|err| StorageError::malformed(TABLE, "COUNT(*)", err))
    }

    /// Returns the number of deleted rows (0 when the product was not in the cart)
    pub(crate) fn delete(&self, conn: &Connection, id: ProductId) -> Result<usize, StorageError> {
        let deleted = conn.execute("DELETE FROM cart_entries WHERE product_id = ?1", [id])?;
        debug!(product_id = %id, deleted, "deleted cart entry");
        Ok(deleted)
    }

    pub(crate) fn update_count(
        &self,
        conn: &Connection,
        id: ProductId,
        count: u32,
    ) -> Result<usize, StorageError> {
        ensure_positive(count)?;

        let updated = conn.execute(
            "UPDATE cart_entries SET count = ?1 WHERE product_id = ?2",
            params![count, id],
        )?;
        Ok(updated)
    }

    pub(crate) fn update_selected(
        &self,
        conn: &Connection,
        id: ProductId,
        is_selected: bool,
    ) -> Result<usize, StorageError> {
        let updated = conn.execute(
            "UPDATE cart_entries SET is_selected = ?1 WHERE product_id = ?2",
            params![is_selected, id],
        )?;
        Ok(updated)
    }
}

fn ensure_positive(count: u32) -> Result<(), StorageError> {
    if count == 0 {
        return Err(StorageError::invalid(
            "cart count must be at least 1; remove the entry instead",
        ));
    }
    Ok(())
}

fn collect(rows: &mut rusqlite::Rows<'_>) -> Result<Vec<CartEntry>, StorageError> {
    let mut entries = Vec::new();
    while let Some(row) = rows.next()? {
        entries.push(decode(row)?);
    }
    Ok(entries)
}

fn decode(row: &Row<'_>) -> Result<CartEntry, StorageError> {
    let count: i64 = column(row, TABLE, "count")?;
    let count = u32::try_from(count)
        .ok()
        .filter(|count| *count > 0)
        .ok_or_else(|| StorageError::malformed(TABLE, "count", format!("count {count} is not positive")))?;

    Ok(CartEntry {
        product_id: column(row, TABLE, "product_id")?,
        count,
        is_selected: column(row, TABLE, "is_selected")?,
    })
}
