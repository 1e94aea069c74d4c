//! Shopping repository
//!
//! Unifies the product, cart and recently-viewed stores behind one API and
//! composes their raw rows into domain entities. Every call is synchronous
//! and runs against the connection owned by the injected [`Database`].

use tracing::{debug, info, instrument};

use super::cart::CartStore;
use super::data::{CartEntry, CartProduct, NewProduct, Product, ProductId, SeedReport};
use super::database::Database;
use super::error::StorageError;
use super::products::ProductStore;
use super::recent::RecentlyViewedStore;

/// Operations the UI layer performs against the catalog, cart and recency list.
pub trait ShoppingRepository {
    /// Up to `count` products starting at offset `from`, in insertion order.
    /// Past the end this is an empty list, not an error.
    fn list_products(&self, from: usize, count: usize) -> Result<Vec<Product>, StorageError>;

    /// Up to `count` cart entries starting at `from`, each resolved to its product.
    fn list_cart_products(&self, from: usize, count: usize)
        -> Result<Vec<CartProduct>, StorageError>;

    /// Total number of cart entries.
    fn cart_size(&self) -> Result<usize, StorageError>;

    /// Every selected cart entry, in storage order.
    fn list_selected_cart_products(&self) -> Result<Vec<CartProduct>, StorageError>;

    fn get_product(&self, id: ProductId) -> Result<Product, StorageError>;

    fn get_cart_product(&self, id: ProductId) -> Result<CartProduct, StorageError>;

    /// Put a product in the cart. Fails with `AlreadyExists` if it is already there.
    fn add_to_cart(
        &self,
        id: ProductId,
        count: u32,
        is_selected: bool,
    ) -> Result<(), StorageError>;

    /// No-op when the product is not in the cart.
    fn remove_from_cart(&self, id: ProductId) -> Result<(), StorageError>;

    /// No-op when the product is not in the cart.
    fn set_cart_count(&self, id: ProductId, count: u32) -> Result<(), StorageError>;

    /// No-op when the product is not in the cart.
    fn set_cart_selected(&self, id: ProductId, is_selected: bool) -> Result<(), StorageError>;

    /// Make `id` the most recent entry of the recency list, dropping any older occurrence.
    fn record_view(&self, id: ProductId) -> Result<(), StorageError>;

    /// Recently viewed products, newest first.
    fn list_recently_viewed(&self) -> Result<Vec<Product>, StorageError>;

    /// No-op when the product was never viewed.
    fn remove_from_recently_viewed(&self, id: ProductId) -> Result<(), StorageError>;
}

/// [`ShoppingRepository`] backed by the local SQLite database.
#[derive(Debug)]
pub struct SqliteRepository {
    db: Database,
    products: ProductStore,
    cart: CartStore,
    recent: RecentlyViewedStore,
}

impl SqliteRepository {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            products: ProductStore,
            cart: CartStore,
            recent: RecentlyViewedStore,
        }
    }

    /// Give the database handle back, e.g. to close it explicitly
    pub fn into_database(self) -> Database {
        self.db
    }

    /// Insert one catalog product.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_product(&self, product: &NewProduct) -> Result<(), StorageError> {
        self.products.insert(self.db.conn(), product)
    }

    /// Number of products in the catalog
    pub fn product_count(&self) -> Result<usize, StorageError> {
        self.products.count(self.db.conn())
    }

    /// Insert every product whose id is not stored yet, all in one transaction.
    #[instrument(skip_all, fields(products = products.len()))]
    pub fn seed_catalog(&self, products: &[NewProduct]) -> Result<SeedReport, StorageError> {
        let tx = self.db.conn().unchecked_transaction()?;
        let mut report = SeedReport::default();

        for product in products {
            match self.products.insert(&tx, product) {
                Ok(()) => report.inserted += 1,
                Err(StorageError::AlreadyExists { .. }) => report.skipped += 1,
                Err(err) => return Err(err),
            }
        }

        tx.commit()?;

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "catalog seeded"
        );
        Ok(report)
    }

    /// Resolve raw cart rows into cart products
    fn resolve(&self, entries: Vec<CartEntry>) -> Result<Vec<CartProduct>, StorageError> {
        entries
            .into_iter()
            .map(|entry| self.resolve_one(entry))
            .collect()
    }

    fn resolve_one(&self, entry: CartEntry) -> Result<CartProduct, StorageError> {
        let product = self.products.get(self.db.conn(), entry.product_id)?;
        Ok(CartProduct {
            product,
            count: entry.count,
            is_selected: entry.is_selected,
        })
    }

    fn ensure_product(&self, id: ProductId) -> Result<(), StorageError> {
        if self.products.exists(self.db.conn(), id)? {
            Ok(())
        } else {
            Err(StorageError::NotFound {
                entity: "product",
                id,
            })
        }
    }
}

impl ShoppingRepository for SqliteRepository {
    fn list_products(&self, from: usize, count: usize) -> Result<Vec<Product>, StorageError> {
        let products = self.products.list(self.db.conn(), from, count)?;
        debug!(from, count, returned = products.len(), "listed products");
        Ok(products)
    }

    fn list_cart_products(
        &self,
        from: usize,
        count: usize,
    ) -> Result<Vec<CartProduct>, StorageError> {
        let entries = self.cart.list(self.db.conn(), from, count)?;
        debug!(from, count, returned = entries.len(), "listed cart entries");
        self.resolve(entries)
    }

    fn cart_size(&self) -> Result<usize, StorageError> {
        self.cart.count(self.db.conn())
    }

    fn list_selected_cart_products(&self) -> Result<Vec<CartProduct>, StorageError> {
        let entries = self.cart.list_selected(self.db.conn())?;
        self.resolve(entries)
    }

    fn get_product(&self, id: ProductId) -> Result<Product, StorageError> {
        self.products.get(self.db.conn(), id)
    }

    fn get_cart_product(&self, id: ProductId) -> Result<CartProduct, StorageError> {
        let entry = self.cart.get(self.db.conn(), id)?;
        self.resolve_one(entry)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn add_to_cart(
        &self,
        id: ProductId,
        count: u32,
        is_selected: bool,
    ) -> Result<(), StorageError> {
        self.ensure_product(id)?;
        self.cart.insert(
            self.db.conn(),
            CartEntry {
                product_id: id,
                count,
                is_selected,
            },
        )
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn remove_from_cart(&self, id: ProductId) -> Result<(), StorageError> {
        self.cart.delete(self.db.conn(), id)?;
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn set_cart_count(&self, id: ProductId, count: u32) -> Result<(), StorageError> {
        let updated = self.cart.update_count(self.db.conn(), id, count)?;
        debug!(updated, "set cart count");
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn set_cart_selected(&self, id: ProductId, is_selected: bool) -> Result<(), StorageError> {
        let updated = self.cart.update_selected(self.db.conn(), id, is_selected)?;
        debug!(updated, "set cart selection");
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn record_view(&self, id: ProductId) -> Result<(), StorageError> {
        self.ensure_product(id)?;
        self.recent.record(self.db.conn(), id)
    }

    fn list_recently_viewed(&self) -> Result<Vec<Product>, StorageError> {
        self.recent
            .list(self.db.conn())?
            .into_iter()
            .map(|id| self.products.get(self.db.conn(), id))
            .collect()
    }

    #[instrument(skip(self), fields(product_id = %id))]
    fn remove_from_recently_viewed(&self, id: ProductId) -> Result<(), StorageError> {
        self.recent.delete(self.db.conn(), id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    const PRICE: u64 = 1_000;

    fn repository_with_products(count: i64) -> SqliteRepository {
        let repository = SqliteRepository::new(Database::open_in_memory().unwrap());
        let products: Vec<NewProduct> = (1..=count)
            .map(|id| NewProduct {
                id: ProductId(id),
                name: format!("Product {id}"),
                image_url: format!("https://example.com/{id}.png"),
                price: PRICE,
            })
            .collect();
        repository.seed_catalog(&products).unwrap();
        repository
    }

    fn ids(products: &[Product]) -> Vec<i64> {
        products.iter().map(|p| p.id.0).collect()
    }

    #[test]
    fn test_consecutive_pages_rebuild_the_catalog() -> TestResult {
        let repository = repository_with_products(7);
        let everything = repository.list_products(0, 100)?;

        let mut paged = Vec::new();
        for page in 0..4 {
            let chunk = repository.list_products(page * 3, 3)?;
            assert!(chunk.len() <= 3, "page {page} returned {} items", chunk.len());
            paged.extend(chunk);
        }

        assert_eq!(paged, everything);
        assert_eq!(ids(&everything), vec![1, 2, 3, 4, 5, 6, 7]);
        Ok(())
    }

    #[test]
    fn test_pages_follow_seed_order_not_id_order() -> TestResult {
        let repository = SqliteRepository::new(Database::open_in_memory()?);
        let products: Vec<NewProduct> = [40, 7, 23, 1, 15]
            .into_iter()
            .map(|id| NewProduct {
                id: ProductId(id),
                name: format!("Product {id}"),
                image_url: String::new(),
                price: PRICE,
            })
            .collect();
        repository.seed_catalog(&products)?;

        assert_eq!(ids(&repository.list_products(0, 2)?), vec![40, 7]);
        assert_eq!(ids(&repository.list_products(2, 2)?), vec![23, 1]);
        assert_eq!(ids(&repository.list_products(4, 2)?), vec![15]);

        // Adding later still lands at the end, whatever the id
        repository.add_product(&NewProduct {
            id: ProductId(2),
            name: "Late".to_string(),
            image_url: String::new(),
            price: PRICE,
        })?;
        assert_eq!(ids(&repository.list_products(4, 2)?), vec![15, 2]);
        Ok(())
    }

    #[test]
    fn test_listing_past_the_end_is_empty() -> TestResult {
        let repository = repository_with_products(3);

        assert!(repository.list_products(3, 10)?.is_empty());
        assert!(repository.list_products(0, 0)?.is_empty());
        assert!(repository.list_cart_products(5, 10)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_product_missing_is_not_found() {
        let repository = repository_with_products(1);

        let result = repository.get_product(ProductId(42));

        assert!(
            matches!(result, Err(StorageError::NotFound { entity: "product", .. })),
            "expected NotFound, got {result:?}"
        );
    }

    #[test]
    fn test_cart_products_are_resolved() -> TestResult {
        let repository = repository_with_products(3);
        repository.add_to_cart(ProductId(2), 3, true)?;
        repository.add_to_cart(ProductId(1), 1, false)?;

        let cart = repository.list_cart_products(0, 10)?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0].product, repository.get_product(ProductId(2))?);
        assert_eq!(cart[0].count, 3);
        assert!(cart[0].is_selected);
        assert_eq!(cart[1].product.id, ProductId(1));
        assert!(!cart[1].is_selected);
        assert_eq!(repository.cart_size()?, 2);
        Ok(())
    }

    #[test]
    fn test_add_to_cart_twice_is_a_conflict() -> TestResult {
        let repository = repository_with_products(1);
        repository.add_to_cart(ProductId(1), 1, true)?;

        let result = repository.add_to_cart(ProductId(1), 2, true);

        assert!(
            matches!(result, Err(StorageError::AlreadyExists { .. })),
            "expected AlreadyExists, got {result:?}"
        );
        assert_eq!(repository.cart_size()?, 1);
        assert_eq!(repository.get_cart_product(ProductId(1))?.count, 1);
        Ok(())
    }

    #[test]
    fn test_add_unknown_product_to_cart() {
        let repository = repository_with_products(1);

        let result = repository.add_to_cart(ProductId(9), 1, true);

        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_remove_from_cart_then_get_is_not_found() -> TestResult {
        let repository = repository_with_products(2);
        repository.add_to_cart(ProductId(1), 1, true)?;

        repository.remove_from_cart(ProductId(1))?;
        // Removing again is a no-op
        repository.remove_from_cart(ProductId(1))?;

        let result = repository.get_cart_product(ProductId(1));
        assert!(
            matches!(result, Err(StorageError::NotFound { entity: "cart entry", .. })),
            "expected NotFound, got {result:?}"
        );
        Ok(())
    }

    #[test]
    fn test_set_cart_count() -> TestResult {
        let repository = repository_with_products(1);
        repository.add_to_cart(ProductId(1), 1, true)?;

        repository.set_cart_count(ProductId(1), 5)?;

        assert_eq!(repository.get_cart_product(ProductId(1))?.count, 5);
        Ok(())
    }

    #[test]
    fn test_updates_on_absent_entry_are_noops() -> TestResult {
        let repository = repository_with_products(1);

        repository.set_cart_count(ProductId(1), 5)?;
        repository.set_cart_selected(ProductId(1), true)?;

        assert_eq!(repository.cart_size()?, 0);
        Ok(())
    }

    #[test]
    fn test_selected_cart_products() -> TestResult {
        let repository = repository_with_products(4);
        for id in 1..=4 {
            repository.add_to_cart(ProductId(id), 1, id % 2 == 0)?;
        }
        repository.set_cart_selected(ProductId(1), true)?;
        repository.set_cart_selected(ProductId(4), false)?;

        let selected: Vec<i64> = repository
            .list_selected_cart_products()?
            .iter()
            .map(|c| c.product.id.0)
            .collect();

        assert_eq!(selected, vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_record_view_twice_keeps_one_entry() -> TestResult {
        let repository = repository_with_products(2);

        repository.record_view(ProductId(1))?;
        repository.record_view(ProductId(1))?;

        assert_eq!(ids(&repository.list_recently_viewed()?), vec![1]);
        Ok(())
    }

    #[test]
    fn test_record_view_reorders_by_recency() -> TestResult {
        let repository = repository_with_products(2);

        repository.record_view(ProductId(1))?;
        repository.record_view(ProductId(2))?;
        repository.record_view(ProductId(1))?;

        assert_eq!(ids(&repository.list_recently_viewed()?), vec![1, 2]);
        Ok(())
    }

    #[test]
    fn test_record_view_of_unknown_product() {
        let repository = repository_with_products(1);

        let result = repository.record_view(ProductId(5));

        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_remove_from_recently_viewed() -> TestResult {
        let repository = repository_with_products(3);
        for id in 1..=3 {
            repository.record_view(ProductId(id))?;
        }

        repository.remove_from_recently_viewed(ProductId(2))?;
        repository.remove_from_recently_viewed(ProductId(2))?;

        assert_eq!(ids(&repository.list_recently_viewed()?), vec![3, 1]);
        Ok(())
    }

    #[test]
    fn test_seeding_twice_skips_existing_ids() -> TestResult {
        let repository = repository_with_products(3);
        let again = vec![
            NewProduct {
                id: ProductId(3),
                name: "Duplicate".to_string(),
                image_url: String::new(),
                price: 1,
            },
            NewProduct {
                id: ProductId(4),
                name: "New".to_string(),
                image_url: String::new(),
                price: 1,
            },
        ];

        let report = repository.seed_catalog(&again)?;

        assert_eq!(report, SeedReport { inserted: 1, skipped: 1 });
        assert_eq!(repository.product_count()?, 4);
        assert_eq!(repository.get_product(ProductId(3))?.name, "Product 3");
        Ok(())
    }

    #[test]
    fn test_invalid_seed_rolls_back() {
        let repository = repository_with_products(0);
        let products = vec![
            NewProduct {
                id: ProductId(1),
                name: "Fine".to_string(),
                image_url: String::new(),
                price: 1,
            },
            NewProduct {
                id: ProductId(2),
                name: String::new(),
                image_url: String::new(),
                price: 1,
            },
        ];

        assert!(repository.seed_catalog(&products).is_err());
        assert_eq!(repository.product_count().unwrap(), 0);
    }
}
