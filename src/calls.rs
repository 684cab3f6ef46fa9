//! Direct-call signaling between two known users.
//!
//! The caller addresses the target by user id through the registry; the
//! answer path skips the registry and addresses the caller's connection id
//! carried in the incoming-call notification, so an accept still reaches
//! the caller even if their registration was overwritten in the meantime.

use crate::state::AppState;
use crate::ws::broadcast::{send_event, send_to_connection};
use crate::ws::protocol::ServerEvent;
use crate::ws::ConnectionSender;

/// Handle `initiate-call`: look the target up in the registry and ring it,
/// or tell the caller the target is offline. No retry, no queueing.
pub fn handle_initiate_call(
    state: &AppState,
    tx: &ConnectionSender,
    connection_id: &str,
    target_user_id: &str,
    room_id: String,
) {
    match state.registry.connection_for(target_user_id) {
        Some(target_connection) => {
            tracing::info!(
                target_user_id = %target_user_id,
                room_id = %room_id,
                "Call initiated"
            );
            send_to_connection(
                &state.connections,
                &target_connection,
                &ServerEvent::IncomingCall {
                    room_id,
                    caller_id: connection_id.to_string(),
                },
            );
        }
        None => {
            send_event(
                tx,
                &ServerEvent::CallFailed {
                    message: "User is not online".to_string(),
                },
            );
        }
    }
}

/// Handle `accept-call`: relay straight to the caller's connection.
/// A dead or unknown caller connection is a silent no-op.
pub fn handle_accept_call(
    state: &AppState,
    connection_id: &str,
    room_id: String,
    caller_id: &str,
) {
    send_to_connection(
        &state.connections,
        caller_id,
        &ServerEvent::CallAccepted {
            room_id,
            accepter_id: connection_id.to_string(),
        },
    );
}

/// Handle `reject-call`: relay straight to the caller's connection.
pub fn handle_reject_call(
    state: &AppState,
    connection_id: &str,
    room_id: String,
    caller_id: &str,
) {
    send_to_connection(
        &state.connections,
        caller_id,
        &ServerEvent::CallRejected {
            room_id,
            rejecter_id: connection_id.to_string(),
        },
    );
}
