//! Wire protocol and dispatch.
//!
//! Every message is a JSON text frame `{"event": <name>, "data": <payload>}`.
//! Event names and payload fields are the contract with the deployed browser
//! client and must not change spelling — hence the per-variant renames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;
use crate::ws::broadcast::send_event;
use crate::ws::ConnectionSender;
use crate::{calls, matchmaking, presence, rooms};

/// The other party of a match, as delivered to each matched client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerInfo {
    pub username: String,
    pub id: String,
}

/// Payload of both matchmaking join events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub user_id: String,
    pub username: String,
}

/// Client → server events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    /// Bare user id; claims this connection for that user. Unauthenticated,
    /// last registration wins.
    #[serde(rename = "register-user")]
    RegisterUser(String),

    #[serde(rename = "join-random-queue")]
    JoinRandomQueue(JoinRequest),

    /// Bare user id.
    #[serde(rename = "leave-random-queue")]
    LeaveRandomQueue(String),

    #[serde(rename = "join-waiting-room")]
    JoinWaitingRoom(JoinRequest),

    /// Bare user id.
    #[serde(rename = "leave-waiting-room")]
    LeaveWaitingRoom(String),

    #[serde(rename = "initiate-call")]
    #[serde(rename_all = "camelCase")]
    InitiateCall {
        target_user_id: String,
        room_id: String,
    },

    /// `caller_id` is the caller's connection id, echoed back from the
    /// incoming-call notification.
    #[serde(rename = "accept-call")]
    #[serde(rename_all = "camelCase")]
    AcceptCall { room_id: String, caller_id: String },

    #[serde(rename = "reject-call")]
    #[serde(rename_all = "camelCase")]
    RejectCall { room_id: String, caller_id: String },

    /// Bare room id.
    #[serde(rename = "join-room")]
    JoinRoom(String),

    /// Bare room id.
    #[serde(rename = "leave-room")]
    LeaveRoom(String),

    #[serde(rename = "offer")]
    #[serde(rename_all = "camelCase")]
    Offer { offer: Value, room_id: String },

    #[serde(rename = "answer")]
    #[serde(rename_all = "camelCase")]
    Answer { answer: Value, room_id: String },

    #[serde(rename = "ice-candidate")]
    #[serde(rename_all = "camelCase")]
    IceCandidate { candidate: Value, room_id: String },

    /// Arbitrary chat payload; must carry a `roomId` field. Relayed verbatim.
    #[serde(rename = "send-message")]
    SendMessage(Value),

    #[serde(rename = "end-call")]
    #[serde(rename_all = "camelCase")]
    EndCall { room_id: String },
}

/// Server → client events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "user-status-change")]
    #[serde(rename_all = "camelCase")]
    UserStatusChange { user_id: String, is_online: bool },

    #[serde(rename = "random-match-found")]
    #[serde(rename_all = "camelCase")]
    RandomMatchFound { room_id: String, peer: PeerInfo },

    #[serde(rename = "match-found")]
    #[serde(rename_all = "camelCase")]
    MatchFound { room_id: String, peer: PeerInfo },

    #[serde(rename = "waiting-for-match")]
    WaitingForMatch,

    #[serde(rename = "matching-error")]
    MatchingError { message: String },

    /// `caller_id` is the caller's connection id — the addressing key the
    /// target echoes back in accept-call / reject-call.
    #[serde(rename = "incoming-call")]
    #[serde(rename_all = "camelCase")]
    IncomingCall { room_id: String, caller_id: String },

    #[serde(rename = "call-accepted")]
    #[serde(rename_all = "camelCase")]
    CallAccepted {
        room_id: String,
        accepter_id: String,
    },

    #[serde(rename = "call-rejected")]
    #[serde(rename_all = "camelCase")]
    CallRejected {
        room_id: String,
        rejecter_id: String,
    },

    #[serde(rename = "call-failed")]
    CallFailed { message: String },

    #[serde(rename = "offer")]
    Offer { offer: Value, from: String },

    #[serde(rename = "answer")]
    Answer { answer: Value, from: String },

    #[serde(rename = "ice-candidate")]
    IceCandidate { candidate: Value, from: String },

    #[serde(rename = "receive-message")]
    ReceiveMessage(Value),

    #[serde(rename = "call-ended")]
    CallEnded,

    /// Connection id of a participant that left the room.
    #[serde(rename = "user-disconnected")]
    UserDisconnected(String),

    /// Malformed frame or unknown event; the connection stays open.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Handle one incoming text frame: decode, dispatch, reply.
///
/// A frame that fails to decode earns the sender an `error` event and is
/// otherwise dropped — a bad client cannot take the connection down.
pub async fn handle_text_frame(
    text: &str,
    tx: &ConnectionSender,
    state: &AppState,
    connection_id: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(
                connection_id = %connection_id,
                error = %e,
                "Failed to decode client frame"
            );
            send_event(
                tx,
                &ServerEvent::Error {
                    message: format!("Invalid message: {}", e),
                },
            );
            return;
        }
    };

    dispatch(event, tx, state, connection_id).await;
}

/// Route a decoded event to its domain handler.
async fn dispatch(
    event: ClientEvent,
    tx: &ConnectionSender,
    state: &AppState,
    connection_id: &str,
) {
    match event {
        ClientEvent::RegisterUser(user_id) => {
            presence::handle_register_user(state, connection_id, &user_id).await;
        }
        ClientEvent::JoinRandomQueue(req) => {
            matchmaking::handle_join_random_queue(state, tx, connection_id, req);
        }
        ClientEvent::LeaveRandomQueue(user_id) => {
            matchmaking::handle_leave_random_queue(state, &user_id);
        }
        ClientEvent::JoinWaitingRoom(req) => {
            matchmaking::handle_join_waiting_room(state, tx, connection_id, req);
        }
        ClientEvent::LeaveWaitingRoom(user_id) => {
            matchmaking::handle_leave_waiting_room(state, &user_id);
        }
        ClientEvent::InitiateCall {
            target_user_id,
            room_id,
        } => {
            calls::handle_initiate_call(state, tx, connection_id, &target_user_id, room_id);
        }
        ClientEvent::AcceptCall { room_id, caller_id } => {
            calls::handle_accept_call(state, connection_id, room_id, &caller_id);
        }
        ClientEvent::RejectCall { room_id, caller_id } => {
            calls::handle_reject_call(state, connection_id, room_id, &caller_id);
        }
        ClientEvent::JoinRoom(room_id) => {
            rooms::handle_join_room(state, connection_id, &room_id);
        }
        ClientEvent::LeaveRoom(room_id) => {
            rooms::handle_leave_room(state, connection_id, &room_id);
        }
        ClientEvent::Offer { offer, room_id } => {
            rooms::relay(
                state,
                connection_id,
                &room_id,
                ServerEvent::Offer {
                    offer,
                    from: connection_id.to_string(),
                },
            );
        }
        ClientEvent::Answer { answer, room_id } => {
            rooms::relay(
                state,
                connection_id,
                &room_id,
                ServerEvent::Answer {
                    answer,
                    from: connection_id.to_string(),
                },
            );
        }
        ClientEvent::IceCandidate { candidate, room_id } => {
            rooms::relay(
                state,
                connection_id,
                &room_id,
                ServerEvent::IceCandidate {
                    candidate,
                    from: connection_id.to_string(),
                },
            );
        }
        ClientEvent::SendMessage(data) => {
            rooms::handle_send_message(state, tx, connection_id, data);
        }
        ClientEvent::EndCall { room_id } => {
            rooms::handle_end_call(state, connection_id, &room_id);
        }
    }
}
