//! Shared HTTP adapter state.

use std::sync::Arc;

use cap_std::fs::Dir;

/// Dependency bundle for the HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Sandbox the static asset handler serves from.
    pub public_dir: Arc<Dir>,
    /// Number of synthetic products per `GET /api/productos-test`.
    pub products_test_count: u32,
}

impl HttpState {
    pub fn new(public_dir: Dir, products_test_count: u32) -> Self {
        Self {
            public_dir: Arc::new(public_dir),
            products_test_count,
        }
    }
}
