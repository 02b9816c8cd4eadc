//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use cap_std::fs::Dir;
use url::Url;

use showroom::domain::CollectionStores;

const DEFAULT_PRODUCTS_TEST_COUNT: u32 = 5;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) stores: CollectionStores,
    pub(crate) public_dir: Dir,
    pub(crate) allowed_origins: Vec<Url>,
    pub(crate) products_test_count: u32,
}

impl ServerConfig {
    /// Construct a configuration with no allowed WebSocket origins and the
    /// default synthetic listing size.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, stores: CollectionStores, public_dir: Dir) -> Self {
        Self {
            bind_addr,
            stores,
            public_dir,
            allowed_origins: Vec::new(),
            products_test_count: DEFAULT_PRODUCTS_TEST_COUNT,
        }
    }

    /// Replace the WebSocket origin allow-list.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: impl IntoIterator<Item = Url>) -> Self {
        self.allowed_origins = origins.into_iter().collect();
        self
    }

    /// Set how many products `GET /api/productos-test` returns.
    #[must_use]
    pub fn with_products_test_count(mut self, count: u32) -> Self {
        self.products_test_count = count;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
