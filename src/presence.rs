//! Connection registry and presence broadcast.
//!
//! Maps each registered user id to its live connection id and mirrors
//! online/offline transitions into the external account store, announcing
//! them to every connected client.

use dashmap::DashMap;
use std::sync::Arc;

use crate::db::accounts;
use crate::state::AppState;
use crate::ws::broadcast::broadcast_to_all;
use crate::ws::protocol::ServerEvent;

/// Live mapping from user id to connection id.
///
/// Registration is unauthenticated and last-wins: any connection may claim
/// any user id, and a newer registration silently overwrites an older one.
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Arc<DashMap<String, String>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the mapping for a user.
    pub fn register(&self, user_id: &str, connection_id: &str) {
        self.users
            .insert(user_id.to_string(), connection_id.to_string());
    }

    /// Look up the live connection for a user, if any.
    pub fn connection_for(&self, user_id: &str) -> Option<String> {
        self.users.get(user_id).map(|entry| entry.value().clone())
    }

    /// Remove the registration owned by a connection and return its user id.
    ///
    /// If the user re-registered from a newer connection, the old connection
    /// no longer appears here and this returns None — the newer registration
    /// survives its predecessor's disconnect.
    pub fn remove_connection(&self, connection_id: &str) -> Option<String> {
        let user_id = self
            .users
            .iter()
            .find(|entry| entry.value() == connection_id)
            .map(|entry| entry.key().clone())?;

        self.users
            .remove_if(&user_id, |_, mapped| mapped == connection_id);
        Some(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Handle `register-user`: record the mapping, mark the user online in the
/// account store, and broadcast the transition.
///
/// The broadcast is gated on the store update: a store failure is logged and
/// suppresses the status event entirely. Updating a user id the store has
/// never seen is a success.
pub async fn handle_register_user(state: &AppState, connection_id: &str, user_id: &str) {
    state.registry.register(user_id, connection_id);

    match accounts::set_online_status(&state.db, user_id, true).await {
        Ok(()) => {
            tracing::info!(user_id = %user_id, connection_id = %connection_id, "User registered");
            broadcast_to_all(
                &state.connections,
                &ServerEvent::UserStatusChange {
                    user_id: user_id.to_string(),
                    is_online: true,
                },
            );
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Error updating online status");
        }
    }
}

/// Handle a disconnect: if this connection owned a registration, drop it,
/// mark the user offline, and broadcast. Same store-failure suppression as
/// registration.
pub async fn handle_disconnect(state: &AppState, connection_id: &str) {
    let Some(user_id) = state.registry.remove_connection(connection_id) else {
        return;
    };

    match accounts::set_online_status(&state.db, &user_id, false).await {
        Ok(()) => {
            broadcast_to_all(
                &state.connections,
                &ServerEvent::UserStatusChange {
                    user_id,
                    is_online: false,
                },
            );
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Error updating offline status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_overwrites() {
        let registry = UserRegistry::new();
        registry.register("u1", "conn-a");
        registry.register("u1", "conn-b");
        assert_eq!(registry.connection_for("u1").as_deref(), Some("conn-b"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_connection_returns_owner() {
        let registry = UserRegistry::new();
        registry.register("u1", "conn-a");
        assert_eq!(registry.remove_connection("conn-a").as_deref(), Some("u1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_overwritten_connection_is_not_found() {
        let registry = UserRegistry::new();
        registry.register("u1", "conn-a");
        registry.register("u1", "conn-b");
        // conn-a was displaced; its disconnect must not unregister conn-b
        assert_eq!(registry.remove_connection("conn-a"), None);
        assert_eq!(registry.connection_for("u1").as_deref(), Some("conn-b"));
    }
}
