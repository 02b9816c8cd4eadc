//! Deterministic example product data for demonstration purposes.
//!
//! The crate produces believable catalogue entries for the synthetic
//! products endpoint. It is deliberately independent of backend domain types
//! so the backend can map the generated values into its own records.
//!
//! # Example
//!
//! ```
//! use example_data::{ProductBatch, generate_example_products};
//!
//! let batch = ProductBatch::new(42, 5);
//! let products = generate_example_products(&batch).expect("generation succeeds");
//!
//! assert_eq!(products.len(), 5);
//! assert_eq!(products.first().map(|p| p.id), Some(1));
//! ```

mod error;
mod generator;
mod product;

pub use error::GenerationError;
pub use generator::{DEFAULT_PRODUCT_COUNT, ProductBatch, generate_example_products};
pub use product::ExampleProduct;
