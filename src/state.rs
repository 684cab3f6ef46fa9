use std::sync::Arc;

use crate::db::DbPool;
use crate::matchmaking::pool::{JoinPolicy, PairingPool};
use crate::presence::UserRegistry;
use crate::rooms::RoomDirectory;
use crate::ws::{new_connection_map, ConnectionMap};

/// Shared application state passed to all handlers via axum State extractor.
///
/// This is the whole world: everything except the account store lives in
/// process memory and is rebuilt from zero on restart.
#[derive(Clone)]
pub struct AppState {
    /// External account store (online flags), wrapped in Arc<Mutex>
    pub db: DbPool,
    /// Every live WebSocket connection by connection id
    pub connections: ConnectionMap,
    /// user id → connection id, last registration wins
    pub registry: UserRegistry,
    /// Pool behind join-random-queue / random-match-found
    pub random_queue: Arc<PairingPool>,
    /// Pool behind join-waiting-room / match-found
    pub waiting_room: Arc<PairingPool>,
    /// Relay scopes for matched or calling pairs
    pub rooms: RoomDirectory,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            connections: new_connection_map(),
            registry: UserRegistry::new(),
            random_queue: Arc::new(PairingPool::new(JoinPolicy::DedupeByUserId)),
            waiting_room: Arc::new(PairingPool::new(JoinPolicy::AllowDuplicates)),
            rooms: RoomDirectory::new(),
        }
    }
}
