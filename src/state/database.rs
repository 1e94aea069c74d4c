use std::path::{Path, PathBuf};

use rusqlite::types::FromSql;
use rusqlite::{Connection, Row};
use tracing::{debug, info, warn};

use super::error::StorageError;

/// Schema version written to `PRAGMA user_version` once the tables exist
const SCHEMA_VERSION: i64 = 1;

/// Owns the SQLite connection behind the shopping catalog.
///
/// The connection is opened when the handle is constructed and closed when
/// the handle is dropped (or explicitly through [`Database::close`]).
/// It is handed to the repository rather than kept in a global.
pub struct Database {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file at `path` and initialize the schema.
    ///
    /// Missing parent directories are created first.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();

        // Ensure the parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StorageError::DataDirectory)?;
        }

        let conn = Connection::open(path)?;
        let database = Self::with_connection(conn, Some(path.to_path_buf()))?;

        info!(path = %path.display(), "database initialized");

        Ok(database)
    }

    /// Open a private in-memory database, used by tests and throwaway sessions
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None)
    }

    /// Get the path where the database is stored by default
    ///
    /// - Linux: ~/.local/share/shopping-catalog/shopping.db
    /// - macOS: ~/Library/Application Support/shopping-catalog/shopping.db
    /// - Windows: %APPDATA%\shopping-catalog\shopping.db
    pub fn default_path() -> Result<PathBuf, StorageError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(StorageError::NoDataDirectory)?;

        path.push("shopping-catalog");
        path.push("shopping.db");
        Ok(path)
    }

    fn with_connection(conn: Connection, db_path: Option<PathBuf>) -> Result<Self, StorageError> {
        let database = Self { conn, db_path };
        database.init_schema()?;
        Ok(database)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&self) -> Result<(), StorageError> {
        // Cart and recency rows must point at a real product
        self.conn.pragma_update(None, "foreign_keys", true)?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version >= SCHEMA_VERSION {
            debug!(version, "schema up to date");
            return Ok(());
        }

        self.conn.execute_batch(
            "-- seq keeps catalog insertion order; id is the caller's identity
            CREATE TABLE IF NOT EXISTS products (
                seq             INTEGER PRIMARY KEY AUTOINCREMENT,
                id              INTEGER NOT NULL UNIQUE,
                name            TEXT NOT NULL,
                image_url       TEXT NOT NULL,
                price           INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cart_entries (
                product_id      INTEGER NOT NULL,
                count           INTEGER NOT NULL,
                is_selected     INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(product_id) REFERENCES products(id)
            );

            -- One cart row per product
            CREATE UNIQUE INDEX IF NOT EXISTS idx_cart_entries_product_id
                ON cart_entries(product_id);

            -- Insertion order (rowid) is the recency order
            CREATE TABLE IF NOT EXISTS recently_viewed (
                product_id      INTEGER NOT NULL,
                FOREIGN KEY(product_id) REFERENCES products(id)
            );

            CREATE INDEX IF NOT EXISTS idx_recently_viewed_product_id
                ON recently_viewed(product_id);",
        )?;

        self.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION)?;

        info!(version = SCHEMA_VERSION, "database schema initialized");

        Ok(())
    }

    /// Borrow the live connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Get the path to the database file (`None` for in-memory databases)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Close the connection, reporting any error SQLite raises while flushing.
    ///
    /// Dropping the handle also closes it, but silently.
    pub fn close(self) -> Result<(), StorageError> {
        let path = self.db_path;
        self.conn.close().map_err(|(_, err)| {
            warn!(error = %err, "failed to close database");
            StorageError::StorageUnavailable(err)
        })?;

        debug!(path = ?path, "database closed");
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Read a named column, failing with [`StorageError::Malformed`] when it is
/// missing or holds the wrong type.
pub(crate) fn column<T: FromSql>(
    row: &Row<'_>,
    table: &'static str,
    name: &'static str,
) -> Result<T, StorageError> {
    row.get(name)
        .map_err(|source| StorageError::malformed(table, name, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(database: &Database) -> Vec<String> {
        let mut stmt = database
            .conn()
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_in_memory_schema_has_three_tables() {
        let database = Database::open_in_memory().unwrap();

        assert_eq!(
            table_names(&database),
            vec!["cart_entries", "products", "recently_viewed"]
        );
        assert!(database.path().is_none());
    }

    #[test]
    fn test_foreign_keys_are_enforced() {
        let database = Database::open_in_memory().unwrap();

        let result = database.conn().execute(
            "INSERT INTO cart_entries (product_id, count, is_selected) VALUES (99, 1, 1)",
            [],
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shopping.db");

        Database::open(&path).unwrap().close().unwrap();
        let reopened = Database::open(&path).unwrap();

        assert_eq!(reopened.path(), Some(path.as_path()));
        assert_eq!(table_names(&reopened).len(), 3);
    }
}
