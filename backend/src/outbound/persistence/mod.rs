//! PostgreSQL persistence adapters built on Diesel.

mod diesel_product_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_product_repository::DieselProductRepository;
pub use migrations::{MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
