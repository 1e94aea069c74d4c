//! "Load more" cursor over the product list.

use std::num::NonZeroUsize;

use tracing::debug;

use crate::pager::page_size;
use crate::state::data::Product;
use crate::state::error::StorageError;
use crate::state::repository::ShoppingRepository;

/// Default number of products fetched per batch
pub const DEFAULT_BATCH_SIZE: usize = 20;

const DEFAULT_BATCH: NonZeroUsize = match NonZeroUsize::new(DEFAULT_BATCH_SIZE) {
    Some(size) => size,
    None => panic!("default batch size is zero"),
};

/// Remembers how many products the UI has already shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductFeed {
    batch_size: NonZeroUsize,
    loaded: usize,
}

impl Default for ProductFeed {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH,
            loaded: 0,
        }
    }
}

impl ProductFeed {
    /// A feed reading `batch_size` products per call; 0 is `InvalidArgument`
    pub fn new(batch_size: usize) -> Result<Self, StorageError> {
        Ok(Self {
            batch_size: page_size(batch_size)?,
            loaded: 0,
        })
    }

    /// Fetch the next batch and advance by however many products came back.
    /// An empty batch means the catalog is exhausted.
    pub fn load_more<R: ShoppingRepository>(
        &mut self,
        repo: &R,
    ) -> Result<Vec<Product>, StorageError> {
        let products = repo.list_products(self.loaded, self.batch_size.get())?;
        self.loaded += products.len();

        debug!(loaded = self.loaded, batch = products.len(), "product feed advanced");
        Ok(products)
    }

    /// Number of products read so far
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Start over from the first product
    pub fn reset(&mut self) {
        self.loaded = 0;
    }
}
