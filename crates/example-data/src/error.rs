//! Error types for the example-data crate.

use thiserror::Error;

/// Errors that can occur during product generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The requested batch would produce no products.
    #[error("product batch must request at least one product")]
    EmptyBatch,

    /// The requested batch exceeds the generator's upper bound.
    #[error("product batch of {requested} exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of products requested.
        requested: u32,
        /// Largest batch the generator accepts.
        max: u32,
    },

    /// A generated price string could not be parsed back into a number.
    #[error("generated price '{value}' is not a valid number")]
    InvalidPrice {
        /// The rejected price text.
        value: String,
    },
}
