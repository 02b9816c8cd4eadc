//! Outbound adapters implementing the domain storage ports.
//!
//! - **persistence**: PostgreSQL product catalogue via Diesel
//! - **file_store**: JSON document message log in a sandboxed directory
//! - **memory**: process-local fallbacks for both collections
//!
//! Adapters translate between domain records and their storage format and
//! contain no broadcast logic.

pub mod file_store;
pub mod memory;
pub mod persistence;
