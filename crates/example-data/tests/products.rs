//! Public API behaviour of the example product generator.

#![expect(
    clippy::expect_used,
    reason = "test code uses expect for clear failure messages"
)]

use example_data::{DEFAULT_PRODUCT_COUNT, ProductBatch, generate_example_products};
use rstest::rstest;
use serde_json::Value;

#[rstest]
fn same_seed_produces_identical_batches() {
    let batch = ProductBatch::new(2026, DEFAULT_PRODUCT_COUNT);
    let first = generate_example_products(&batch).expect("generated");
    let second = generate_example_products(&batch).expect("generated");
    assert_eq!(first, second);
}

#[rstest]
fn different_seeds_produce_different_titles() {
    let first = generate_example_products(&ProductBatch::new(1, 5)).expect("generated");
    let second = generate_example_products(&ProductBatch::new(2, 5)).expect("generated");
    let first_titles: Vec<_> = first.iter().map(|p| p.title.as_str()).collect();
    let second_titles: Vec<_> = second.iter().map(|p| p.title.as_str()).collect();
    assert_ne!(first_titles, second_titles);
}

#[rstest]
fn serialises_with_catalogue_field_names() {
    let products = generate_example_products(&ProductBatch::new(5, 1)).expect("generated");
    let value = serde_json::to_value(&products).expect("serialises");
    let product = value.get(0).expect("one product");

    assert_eq!(product.get("id").and_then(Value::as_u64), Some(1));
    assert!(product.get("title").and_then(Value::as_str).is_some());
    assert!(product.get("price").and_then(Value::as_f64).is_some());
    assert!(product.get("thumbnail").and_then(Value::as_str).is_some());
}
