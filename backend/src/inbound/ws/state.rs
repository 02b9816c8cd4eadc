//! Shared WebSocket adapter state.
//!
//! Sessions reach storage only through the coordinator and reach each other
//! only through the connection registry, so tests can swap either side.

use std::sync::Arc;

use url::Url;

use crate::domain::BroadcastCoordinator;
use crate::inbound::ws::connections::ConnectionManager;

/// Dependency bundle for the WebSocket entry point and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub coordinator: BroadcastCoordinator,
    pub connections: Arc<ConnectionManager>,
    pub allowed_origins: Arc<[Url]>,
}

impl WsState {
    /// Construct state from an already wired coordinator and registry.
    ///
    /// The coordinator should publish through `connections`; otherwise
    /// broadcasts never reach the sessions registered here.
    pub fn new(
        coordinator: BroadcastCoordinator,
        connections: Arc<ConnectionManager>,
        allowed_origins: impl IntoIterator<Item = Url>,
    ) -> Self {
        Self {
            coordinator,
            connections,
            allowed_origins: allowed_origins.into_iter().collect(),
        }
    }
}
