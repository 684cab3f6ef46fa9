//! Random-pairing matchmaking.
//!
//! Two protocol-facing entry points share one pool implementation: the
//! random queue (`join-random-queue` / `random-match-found`) and the waiting
//! room (`join-waiting-room` / `match-found`). Matched parties receive the
//! room id and each other's identity but are not auto-joined into the relay
//! scope — each client issues its own join-room afterwards.

pub mod pool;

use chrono::Utc;

use crate::state::AppState;
use crate::ws::broadcast::{send_event, send_to_connection};
use crate::ws::protocol::{JoinRequest, PeerInfo, ServerEvent};
use crate::ws::ConnectionSender;
use pool::{JoinOutcome, PairingPool, WaitingEntry};

/// Which entry point a join came through; decides the outgoing event name.
#[derive(Debug, Clone, Copy)]
enum Variant {
    RandomQueue,
    WaitingRoom,
}

impl Variant {
    fn match_event(self, room_id: String, peer: PeerInfo) -> ServerEvent {
        match self {
            Variant::RandomQueue => ServerEvent::RandomMatchFound { room_id, peer },
            Variant::WaitingRoom => ServerEvent::MatchFound { room_id, peer },
        }
    }
}

/// Mint a room id for a fresh match.
fn new_room_id() -> String {
    format!("random-{}", Utc::now().timestamp_millis())
}

pub fn handle_join_random_queue(
    state: &AppState,
    tx: &ConnectionSender,
    connection_id: &str,
    req: JoinRequest,
) {
    join(
        state,
        tx,
        connection_id,
        req,
        &state.random_queue,
        Variant::RandomQueue,
    );
}

pub fn handle_leave_random_queue(state: &AppState, user_id: &str) {
    if state.random_queue.leave(user_id) {
        tracing::info!(user_id = %user_id, "User left random queue");
    }
}

pub fn handle_join_waiting_room(
    state: &AppState,
    tx: &ConnectionSender,
    connection_id: &str,
    req: JoinRequest,
) {
    join(
        state,
        tx,
        connection_id,
        req,
        &state.waiting_room,
        Variant::WaitingRoom,
    );
}

pub fn handle_leave_waiting_room(state: &AppState, user_id: &str) {
    if state.waiting_room.leave(user_id) {
        tracing::info!(
            user_id = %user_id,
            waiting = state.waiting_room.len(),
            "User left waiting room"
        );
    }
}

fn join(
    state: &AppState,
    tx: &ConnectionSender,
    connection_id: &str,
    req: JoinRequest,
    pool: &PairingPool,
    variant: Variant,
) {
    if req.user_id.is_empty() {
        send_event(
            tx,
            &ServerEvent::MatchingError {
                message: "Missing user id".to_string(),
            },
        );
        return;
    }

    let entry = WaitingEntry {
        connection_id: connection_id.to_string(),
        user_id: req.user_id.clone(),
        username: req.username.clone(),
    };

    match pool.join(entry) {
        JoinOutcome::Matched(partner) => {
            let room_id = new_room_id();

            tracing::info!(
                room_id = %room_id,
                joiner = %req.username,
                partner = %partner.username,
                "Matched users"
            );

            // Each side learns the *other* party's identity
            send_to_connection(
                &state.connections,
                &partner.connection_id,
                &variant.match_event(
                    room_id.clone(),
                    PeerInfo {
                        username: req.username,
                        id: req.user_id,
                    },
                ),
            );
            send_event(
                tx,
                &variant.match_event(
                    room_id,
                    PeerInfo {
                        username: partner.username,
                        id: partner.user_id,
                    },
                ),
            );
        }
        JoinOutcome::Waiting => {
            tracing::info!(
                username = %req.username,
                waiting = pool.len(),
                "User waiting for match"
            );
            send_event(tx, &ServerEvent::WaitingForMatch);
        }
        JoinOutcome::AlreadyWaiting => {
            // Idempotent join: already queued, nothing to say
        }
    }
}
