//! Local storage core of a shopping catalog app.
//!
//! Products, the cart and the recently-viewed list live in one SQLite
//! database reached through [`SqliteRepository`]. [`CartPager`] and
//! [`ProductFeed`] hold the paging state the UI needs on top of it.

pub mod config;
pub mod feed;
pub mod logging;
pub mod pager;
pub mod state;

pub use config::Config;
pub use feed::ProductFeed;
pub use pager::{CartPager, PageState};
pub use state::{
    CartProduct, CatalogSeed, Database, NewProduct, Product, ProductId, ShoppingRepository,
    SqliteRepository, StorageError,
};
