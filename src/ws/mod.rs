pub mod actor;
pub mod broadcast;
pub mod handler;
pub mod protocol;

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Type alias for the sender half of a WebSocket connection's channel.
/// Other parts of the system can clone this to push messages to a specific client.
pub type ConnectionSender = mpsc::UnboundedSender<axum::extract::ws::Message>;

/// Connection map: every live WebSocket connection keyed by its
/// server-assigned connection id. The id dies with the connection; a client
/// that reconnects gets a fresh one.
/// Arc<DashMap<ConnectionId, ConnectionSender>>
pub type ConnectionMap = Arc<DashMap<String, ConnectionSender>>;

/// Create a new empty connection map.
pub fn new_connection_map() -> ConnectionMap {
    Arc::new(DashMap::new())
}
