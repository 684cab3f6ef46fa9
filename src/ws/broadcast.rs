use axum::extract::ws::Message;

use super::{ConnectionMap, ConnectionSender};
use crate::ws::protocol::ServerEvent;

/// Serialize an event and push it down one connection's channel.
pub fn send_event(tx: &ConnectionSender, event: &ServerEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            let _ = tx.send(Message::Text(json.into()));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server event");
        }
    }
}

/// Send an event to a specific connection, if it is still live.
/// Addressing a dead or unknown connection id is a silent no-op.
pub fn send_to_connection(connections: &ConnectionMap, connection_id: &str, event: &ServerEvent) {
    if let Some(tx) = connections.get(connection_id) {
        send_event(tx.value(), event);
    }
}

/// Broadcast an event to every connected client.
pub fn broadcast_to_all(connections: &ConnectionMap, event: &ServerEvent) {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize broadcast event");
            return;
        }
    };
    let msg = Message::Text(json.into());

    for entry in connections.iter() {
        let _ = entry.value().send(msg.clone());
    }
}
