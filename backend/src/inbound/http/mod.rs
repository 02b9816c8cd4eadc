//! HTTP inbound adapter: health checks, synthetic products, and static assets.
//!
//! [`assets::serve_asset`] matches every path, so it must be registered
//! after all other services.

pub mod assets;
pub mod error;
pub mod health;
pub mod state;

pub use error::ApiResult;
