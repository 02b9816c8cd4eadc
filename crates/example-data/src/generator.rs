//! Deterministic product generation from a seed.
//!
//! The same seed and count always produce identical products, which keeps
//! demo screenshots and tests stable.

use fake::Fake;
use fake::faker::lorem::raw::Word;
use fake::locales::EN;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::GenerationError;
use crate::product::ExampleProduct;

/// Number of products returned when the caller does not ask for a count.
pub const DEFAULT_PRODUCT_COUNT: u32 = 5;

/// Upper bound on a single batch.
const MAX_PRODUCT_COUNT: u32 = 100;

/// Whole-unit price range (inclusive lower, exclusive upper).
const PRICE_UNITS: std::ops::Range<u32> = 1..1000;

/// Base image URL; each product appends `?{id}` so browsers do not reuse
/// one cached image for every thumbnail.
const THUMBNAIL_BASE: &str = "https://picsum.photos/640/480";

/// Parameters for one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductBatch {
    seed: u64,
    count: u32,
}

impl ProductBatch {
    /// Describe a batch of `count` products generated from `seed`.
    #[must_use]
    pub const fn new(seed: u64, count: u32) -> Self {
        Self { seed, count }
    }

    /// RNG seed for the batch.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of products to generate.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }
}

/// Generates example products for a batch.
///
/// Products are numbered from 1. Titles are built from two capitalised
/// lorem words, prices carry exactly two decimals, and thumbnails share a
/// base URL with a per-product query suffix.
///
/// # Errors
///
/// Returns [`GenerationError::EmptyBatch`] for a zero count and
/// [`GenerationError::BatchTooLarge`] when the count exceeds the generator's
/// bound.
///
/// # Example
///
/// ```
/// use example_data::{ProductBatch, generate_example_products};
///
/// let batch = ProductBatch::new(7, 3);
/// let first = generate_example_products(&batch).expect("generated");
/// let second = generate_example_products(&batch).expect("generated");
/// assert_eq!(first, second);
/// ```
pub fn generate_example_products(
    batch: &ProductBatch,
) -> Result<Vec<ExampleProduct>, GenerationError> {
    if batch.count() == 0 {
        return Err(GenerationError::EmptyBatch);
    }
    if batch.count() > MAX_PRODUCT_COUNT {
        return Err(GenerationError::BatchTooLarge {
            requested: batch.count(),
            max: MAX_PRODUCT_COUNT,
        });
    }

    let mut rng = ChaCha8Rng::seed_from_u64(batch.seed());
    (1..=batch.count())
        .map(|id| generate_single_product(&mut rng, id))
        .collect()
}

fn generate_single_product(
    rng: &mut ChaCha8Rng,
    id: u32,
) -> Result<ExampleProduct, GenerationError> {
    let title = generate_title(rng);
    let price = generate_price(rng)?;

    Ok(ExampleProduct {
        id,
        title,
        price,
        thumbnail: format!("{THUMBNAIL_BASE}?{id}"),
    })
}

fn generate_title(rng: &mut ChaCha8Rng) -> String {
    let first: String = Word(EN).fake_with_rng(rng);
    let second: String = Word(EN).fake_with_rng(rng);
    format!("{} {second}", capitalise(&first))
}

/// Builds the price from whole units and cents so no float arithmetic is
/// involved.
fn generate_price(rng: &mut ChaCha8Rng) -> Result<f64, GenerationError> {
    let units = rng.random_range(PRICE_UNITS);
    let cents = rng.random_range(0..100_u32);
    let text = format!("{units}.{cents:02}");
    text.parse::<f64>()
        .map_err(|_| GenerationError::InvalidPrice { value: text })
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
