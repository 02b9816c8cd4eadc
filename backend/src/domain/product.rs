//! Catalogue product records.
//!
//! A [`ProductRecord`] is always complete and valid: the WebSocket adapter
//! converts untrusted payloads through [`ProductRecord::try_new`] before the
//! coordinator sees them.

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use super::DomainError;

/// Product identifier as stored in the relational table.
pub type ProductId = i32;

/// Validation failures raised while building a product.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// No identifier was supplied.
    #[error("product id is required")]
    MissingId,
    /// The title was empty once trimmed.
    #[error("product title must not be empty")]
    BlankTitle,
    /// The thumbnail URL was empty once trimmed.
    #[error("product thumbnail must not be empty")]
    BlankThumbnail,
    /// The price was absent, negative, or not a finite number.
    #[error("product price must be a finite, non-negative number")]
    InvalidPrice,
}

impl ProductValidationError {
    /// Wire field name the failure refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingId => "id",
            Self::BlankTitle => "title",
            Self::BlankThumbnail => "thumbnail",
            Self::InvalidPrice => "price",
        }
    }
}

impl From<ProductValidationError> for DomainError {
    fn from(value: ProductValidationError) -> Self {
        DomainError::validation_failure(value.to_string())
            .with_details(json!({ "field": value.field() }))
    }
}

/// A catalogue entry.
///
/// Serialises as `{ id, title, price, thumbnail }`.
///
/// # Examples
/// ```
/// use showroom::domain::ProductRecord;
///
/// let product = ProductRecord::try_new(Some(1), "Globe", 10.0, "globe.png")
///     .expect("valid product");
/// assert_eq!(product.id(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ProductRecord {
    id: ProductId,
    title: String,
    price: f64,
    thumbnail: String,
}

impl ProductRecord {
    /// Validate and build a product.
    pub fn try_new(
        id: Option<ProductId>,
        title: impl Into<String>,
        price: f64,
        thumbnail: impl Into<String>,
    ) -> Result<Self, ProductValidationError> {
        let id = id.ok_or(ProductValidationError::MissingId)?;
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ProductValidationError::BlankTitle);
        }
        if !price.is_finite() || price < 0.0 {
            return Err(ProductValidationError::InvalidPrice);
        }
        let thumbnail = thumbnail.into();
        if thumbnail.trim().is_empty() {
            return Err(ProductValidationError::BlankThumbnail);
        }
        Ok(Self {
            id,
            title,
            price,
            thumbnail,
        })
    }

    /// Product identifier.
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Unit price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Image URL.
    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }
}
