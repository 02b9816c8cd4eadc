//! Realtime product catalogue and chat snapshot broadcaster.
//!
//! Clients connect over `/ws`, receive the full catalogue and normalised
//! message log, and get both again whenever any client writes. HTTP serves
//! health checks, a synthetic product listing, and the static frontend.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
