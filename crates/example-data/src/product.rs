//! Generated product shape.

use serde::Serialize;

/// A synthetic catalogue entry.
///
/// Field names match the wire format of the catalogue so the value can be
/// serialised directly when no further mapping is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleProduct {
    /// Sequential identifier starting at 1 within a batch.
    pub id: u32,
    /// Human-readable product title.
    pub title: String,
    /// Price with two decimal places.
    pub price: f64,
    /// Image URL, made unique per product with a query suffix.
    pub thumbnail: String,
}
