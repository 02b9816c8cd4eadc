//! Builders for the HTTP and WebSocket adapter state.

use std::sync::Arc;

use mockable::Clock;
use url::Url;

use showroom::domain::{BroadcastCoordinator, CollectionStores};
use showroom::inbound::http::state::HttpState;
use showroom::inbound::ws::connections::ConnectionManager;
use showroom::inbound::ws::state::WsState;

/// Wire a coordinator that publishes through a fresh connection registry.
///
/// The registry is shared between the coordinator and the WebSocket entry
/// point so every session registered by `/ws` receives the broadcasts.
pub(crate) fn build_ws_state(
    stores: CollectionStores,
    clock: Arc<dyn Clock>,
    allowed_origins: Vec<Url>,
) -> WsState {
    let connections = Arc::new(ConnectionManager::new());
    let coordinator = BroadcastCoordinator::new(stores, connections.clone(), clock);
    WsState::new(coordinator, connections, allowed_origins)
}

pub(crate) fn build_http_state(public_dir: cap_std::fs::Dir, products_test_count: u32) -> HttpState {
    HttpState::new(public_dir, products_test_count)
}
