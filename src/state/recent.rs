//! Recently-viewed store: the `recently_viewed` table.
//!
//! The table is an append-only log ordered by rowid. Recording a view
//! deletes any earlier row for the same product before appending, so each
//! product appears at most once and the newest row is the latest view.

use rusqlite::Connection;
use tracing::debug;

use super::data::ProductId;
use super::database::column;
use super::error::StorageError;

const TABLE: &str = "recently_viewed";

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RecentlyViewedStore;

impl RecentlyViewedStore {
    /// Move `id` to the newest position, inserting it if it was never viewed
    pub(crate) fn record(&self, conn: &Connection, id: ProductId) -> Result<(), StorageError> {
        // Delete and append must land together or the log could lose the id
        let tx = conn.unchecked_transaction()?;

        let removed = tx.execute("DELETE FROM recently_viewed WHERE product_id = ?1", [id])?;
        tx.execute("INSERT INTO recently_viewed (product_id) VALUES (?1)", [id])?;

        tx.commit()?;

        debug!(product_id = %id, moved = removed > 0, "recorded view");
        Ok(())
    }

    /// Product ids, newest first
    pub(crate) fn list(&self, conn: &Connection) -> Result<Vec<ProductId>, StorageError> {
        let mut stmt =
            conn.prepare_cached("SELECT product_id FROM recently_viewed ORDER BY rowid DESC")?;

        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(column(row, TABLE, "product_id")?);
        }

        Ok(ids)
    }

    pub(crate) fn delete(&self, conn: &Connection, id: ProductId) -> Result<usize, StorageError> {
        let deleted = conn.execute("DELETE FROM recently_viewed WHERE product_id = ?1", [id])?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::NewProduct;
    use crate::state::database::Database;
    use crate::state::products::ProductStore;

    fn database_with_products(ids: &[i64]) -> Database {
        let database = Database::open_in_memory().unwrap();
        for &id in ids {
            ProductStore
                .insert(
                    database.conn(),
                    &NewProduct {
                        id: ProductId(id),
                        name: format!("Product {id}"),
                        image_url: String::new(),
                        price: 0,
                    },
                )
                .unwrap();
        }
        database
    }

    fn ids(database: &Database) -> Vec<i64> {
        RecentlyViewedStore
            .list(database.conn())
            .unwrap()
            .into_iter()
            .map(|id| id.0)
            .collect()
    }

    #[test]
    fn test_list_is_newest_first() {
        let database = database_with_products(&[1, 2, 3]);
        for id in [1, 2, 3] {
            RecentlyViewedStore.record(database.conn(), ProductId(id)).unwrap();
        }

        assert_eq!(ids(&database), vec![3, 2, 1]);
    }

    #[test]
    fn test_rerecording_moves_to_front() {
        let database = database_with_products(&[1, 2, 3]);
        for id in [1, 2, 3, 1] {
            RecentlyViewedStore.record(database.conn(), ProductId(id)).unwrap();
        }

        assert_eq!(ids(&database), vec![1, 3, 2]);
    }

    #[test]
    fn test_failed_insert_keeps_prior_entry() {
        let database = database_with_products(&[1]);
        RecentlyViewedStore.record(database.conn(), ProductId(1)).unwrap();

        // Product 9 does not exist, so the foreign key rejects the append
        assert!(RecentlyViewedStore.record(database.conn(), ProductId(9)).is_err());

        assert_eq!(ids(&database), vec![1]);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let database = database_with_products(&[1]);

        assert_eq!(RecentlyViewedStore.delete(database.conn(), ProductId(1)).unwrap(), 0);
    }
}
