//! Storage port for the product catalogue.
//!
//! The coordinator only needs two capabilities: read the whole catalogue and
//! upsert one product. Adapters (PostgreSQL, in-memory) live under
//! `outbound`.

use async_trait::async_trait;

use crate::domain::ProductRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by product store adapters.
    pub enum ProductRepositoryError {
        /// The store could not be reached.
        Connection =>
            "product store connection failed: {message}",
        /// A read or write failed during execution or row conversion.
        Query =>
            "product store query failed: {message}",
    }
}

/// Port for product storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Return the complete catalogue ordered by id. Must not mutate state.
    async fn list_all(&self) -> Result<Vec<ProductRecord>, ProductRepositoryError>;

    /// Insert or replace the product with the same id and return the stored
    /// form.
    async fn save(&self, product: ProductRecord) -> Result<ProductRecord, ProductRepositoryError>;
}

/// Fixture implementation for tests that do not exercise catalogue storage.
///
/// Lists nothing and echoes saved products back without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProductRepository;

#[async_trait]
impl ProductRepository for FixtureProductRepository {
    async fn list_all(&self) -> Result<Vec<ProductRecord>, ProductRepositoryError> {
        Ok(Vec::new())
    }

    async fn save(&self, product: ProductRecord) -> Result<ProductRecord, ProductRepositoryError> {
        Ok(product)
    }
}
