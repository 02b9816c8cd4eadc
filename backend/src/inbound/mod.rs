//! Inbound adapters that translate external traffic into coordinator calls
//! while keeping framework details at the edge.
//!
//! - [`ws`]: the realtime channel carrying snapshots and client writes
//! - [`http`]: health checks, the synthetic product listing, and static assets

pub mod http;
pub mod ws;
