/// State management module
///
/// This module handles all persisted state:
/// - Database connection and schema (database.rs)
/// - Shared data structures (data.rs)
/// - One store per table (products.rs, cart.rs, recent.rs)
/// - The repository composing them into entities (repository.rs)
/// - Catalog fixture loading (seed.rs)

pub mod data;
pub mod database;
pub mod error;
pub mod repository;
pub mod seed;

mod cart;
mod products;
mod recent;

pub use data::{CartEntry, CartProduct, NewProduct, Product, ProductId, SeedReport};
pub use database::Database;
pub use error::StorageError;
pub use repository::{ShoppingRepository, SqliteRepository};
pub use seed::CatalogSeed;
