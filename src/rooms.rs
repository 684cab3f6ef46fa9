//! Relay scopes ("rooms").
//!
//! Once two parties hold a room id they each subscribe their connection to
//! it; negotiation and chat messages are then relayed to everyone else in
//! the scope. The relay makes no two-party enforcement — nothing stops a
//! third connection from joining the same room id, and relays from a
//! non-member still reach the members (both inherited contract, both pinned
//! by tests).

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::error::SignalingError;
use crate::state::AppState;
use crate::ws::broadcast::{send_event, send_to_connection};
use crate::ws::protocol::ServerEvent;
use crate::ws::ConnectionSender;

/// Room id → subscribed connection ids. Empty rooms are deleted.
#[derive(Debug, Clone, Default)]
pub struct RoomDirectory {
    rooms: Arc<DashMap<String, Vec<String>>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a scope. Re-joining is a no-op.
    pub fn join(&self, room_id: &str, connection_id: &str) {
        let mut members = self.rooms.entry(room_id.to_string()).or_default();
        if !members.iter().any(|m| m == connection_id) {
            members.push(connection_id.to_string());
        }
    }

    /// Unsubscribe a connection from a scope.
    pub fn leave(&self, room_id: &str, connection_id: &str) {
        if let Some(mut members) = self.rooms.get_mut(room_id) {
            members.retain(|m| m != connection_id);
            if members.is_empty() {
                drop(members);
                self.rooms.remove(room_id);
            }
        }
    }

    /// Current members of a scope.
    pub fn members(&self, room_id: &str) -> Vec<String> {
        self.rooms
            .get(room_id)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    /// Remove a connection from every scope it joined.
    /// Returns the affected room ids.
    pub fn leave_all(&self, connection_id: &str) -> Vec<String> {
        let room_ids: Vec<String> = self.rooms.iter().map(|e| e.key().clone()).collect();
        let mut left = Vec::new();

        for room_id in room_ids {
            if let Some(mut members) = self.rooms.get_mut(&room_id) {
                let before = members.len();
                members.retain(|m| m != connection_id);
                let after = members.len();
                if after < before {
                    left.push(room_id.clone());
                }
                if after == 0 {
                    drop(members);
                    self.rooms.remove(&room_id);
                }
            }
        }

        left
    }
}

/// Send an event to every scope member except the sender.
///
/// Membership of the sender itself is not required — mirrors the transport
/// this protocol was born on, where "emit to room" never checked the
/// emitter's own subscription.
pub fn relay(state: &AppState, sender: &str, room_id: &str, event: ServerEvent) {
    for member in state.rooms.members(room_id) {
        if member != sender {
            send_to_connection(&state.connections, &member, &event);
        }
    }
}

pub fn handle_join_room(state: &AppState, connection_id: &str, room_id: &str) {
    state.rooms.join(room_id, connection_id);
    tracing::info!(
        connection_id = %connection_id,
        room_id = %room_id,
        "Connection joined room"
    );
}

/// Handle `leave-room`: unsubscribe, then tell the remaining occupants.
pub fn handle_leave_room(state: &AppState, connection_id: &str, room_id: &str) {
    state.rooms.leave(room_id, connection_id);
    relay(
        state,
        connection_id,
        room_id,
        ServerEvent::UserDisconnected(connection_id.to_string()),
    );
}

/// Handle `send-message`: the chat payload is relayed verbatim, addressed by
/// the `roomId` field it must carry.
pub fn handle_send_message(
    state: &AppState,
    tx: &ConnectionSender,
    connection_id: &str,
    data: Value,
) {
    let Some(room_id) = data.get("roomId").and_then(Value::as_str).map(String::from) else {
        send_event(
            tx,
            &ServerEvent::Error {
                message: SignalingError::MissingField("roomId").to_string(),
            },
        );
        return;
    };

    relay(
        state,
        connection_id,
        &room_id,
        ServerEvent::ReceiveMessage(data),
    );
}

/// Handle `end-call`: notify the rest of the room, then leave it.
pub fn handle_end_call(state: &AppState, connection_id: &str, room_id: &str) {
    tracing::info!(room_id = %room_id, "Call ended");
    relay(state, connection_id, room_id, ServerEvent::CallEnded);
    state.rooms.leave(room_id, connection_id);
}

/// Disconnect cleanup: silently drop the connection from every scope.
pub fn leave_all(state: &AppState, connection_id: &str) {
    let left = state.rooms.leave_all(connection_id);
    if !left.is_empty() {
        tracing::debug!(
            connection_id = %connection_id,
            rooms = left.len(),
            "Removed from rooms on disconnect"
        );
    }
}
