//! Cart paging
//!
//! The free functions are pure page arithmetic over
//! (page number, total count, page size). [`CartPager`] layers the window
//! cache on top: moving forward always fetches a fresh page from the
//! repository, moving back reuses the window that was already loaded.

use std::num::NonZeroUsize;

use tracing::debug;

use crate::state::data::{CartProduct, ProductId};
use crate::state::error::StorageError;
use crate::state::repository::ShoppingRepository;

/// Default number of cart entries per page
pub const DEFAULT_CART_PAGE_SIZE: usize = 3;

/// Index of the last page that holds at least one item.
///
/// An exact multiple of the page size does not open a new page, and an
/// empty collection still has page 0.
pub fn last_page_index(total_count: usize, page_size: NonZeroUsize) -> usize {
    let full_pages = total_count / page_size;
    if total_count % page_size == 0 {
        full_pages.saturating_sub(1)
    } else {
        full_pages
    }
}

/// Number of pages needed to show `total_count` items (0 for an empty cart)
pub fn page_count(total_count: usize, page_size: NonZeroUsize) -> usize {
    total_count.div_ceil(page_size.get())
}

/// True when at least one more full or partial page follows `page_number`
pub fn has_next_page(page_number: usize, total_count: usize, page_size: NonZeroUsize) -> bool {
    page_number < last_page_index(total_count, page_size)
}

pub fn has_previous_page(page_number: usize) -> bool {
    page_number > 0
}

/// 1-based page number shown to the user
pub fn display_page_number(page_number: usize) -> usize {
    page_number + 1
}

/// Validate a caller-supplied page size
pub fn page_size(size: usize) -> Result<NonZeroUsize, StorageError> {
    NonZeroUsize::new(size).ok_or_else(|| StorageError::invalid("page size must be positive"))
}

/// What the navigation controls should show for the current page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub page_number: usize,
    pub display_number: usize,
    pub page_count: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Windowed view over the cart, one page at a time
#[derive(Debug, Clone)]
pub struct CartPager {
    page_size: NonZeroUsize,
    total_count: usize,
    page_number: usize,
    /// Loaded windows, index = page number. Always holds the current page.
    windows: Vec<Vec<CartProduct>>,
}

impl CartPager {
    /// Read the cart size and the first page
    pub fn load<R: ShoppingRepository>(repo: &R, size: usize) -> Result<Self, StorageError> {
        let page_size = page_size(size)?;
        let total_count = repo.cart_size()?;
        let first = repo.list_cart_products(0, page_size.get())?;

        debug!(total_count, page_size = page_size.get(), "cart pager loaded");

        Ok(Self {
            page_size,
            total_count,
            page_number: 0,
            windows: vec![first],
        })
    }

    /// Items on the current page
    pub fn items(&self) -> &[CartProduct] {
        self.windows
            .get(self.page_number)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Navigation state. An empty cart shows page 0 of 0.
    pub fn state(&self) -> PageState {
        let display_number = if self.total_count == 0 {
            0
        } else {
            display_page_number(self.page_number)
        };

        PageState {
            page_number: self.page_number,
            display_number,
            page_count: page_count(self.total_count, self.page_size),
            has_next: has_next_page(self.page_number, self.total_count, self.page_size),
            has_previous: has_previous_page(self.page_number),
        }
    }

    /// Fetch the next page. Does nothing on the last page.
    pub fn to_next_page<R: ShoppingRepository>(
        &mut self,
        repo: &R,
    ) -> Result<&[CartProduct], StorageError> {
        if !has_next_page(self.page_number, self.total_count, self.page_size) {
            return Ok(self.items());
        }

        let next = self.page_number + 1;
        let window = repo.list_cart_products(self.offset(next), self.page_size.get())?;

        self.windows.truncate(next);
        self.windows.push(window);
        self.page_number = next;

        debug!(page_number = next, "moved to next cart page");
        Ok(self.items())
    }

    /// Step back to the retained previous window. Does nothing on page 0.
    pub fn to_previous_page(&mut self) -> &[CartProduct] {
        if has_previous_page(self.page_number) {
            self.page_number -= 1;
            debug!(page_number = self.page_number, "moved to previous cart page");
        }
        self.items()
    }

    /// Remove an entry from the cart and reload the current window.
    ///
    /// Entries after the removed one shift forward, so windows past the
    /// current page are stale and dropped. If the current page ends up
    /// empty the pager steps back a page.
    pub fn remove<R: ShoppingRepository>(
        &mut self,
        repo: &R,
        id: ProductId,
    ) -> Result<&[CartProduct], StorageError> {
        repo.remove_from_cart(id)?;
        self.refresh(repo)
    }

    /// Re-read the total and the current window after the cart changed
    pub fn refresh<R: ShoppingRepository>(
        &mut self,
        repo: &R,
    ) -> Result<&[CartProduct], StorageError> {
        self.total_count = repo.cart_size()?;

        let last = last_page_index(self.total_count, self.page_size);
        if self.page_number > last {
            self.page_number = last;
        }

        let window = repo.list_cart_products(self.offset(self.page_number), self.page_size.get())?;

        self.windows.truncate(self.page_number);
        self.windows.push(window);

        Ok(self.items())
    }

    fn offset(&self, page_number: usize) -> usize {
        page_number * self.page_size.get()
    }
}
