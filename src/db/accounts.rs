//! The external account store, reduced to the one operation the signaling
//! core consumes: set a user's online flag by id.
//!
//! User provisioning belongs to the HTTP account API and is not part of this
//! server; `create_user` exists as that system's seam and for tests.

use chrono::Utc;

use crate::db::DbPool;
use crate::error::SignalingError;

/// Flip a user's `is_online` flag.
///
/// Updating an id with no matching row is a success: the store mirrors the
/// original semantics where a presence update for an unknown account is
/// silently accepted. Only a store-level failure is an error, and callers
/// treat it as log-and-suppress.
pub async fn set_online_status(
    db: &DbPool,
    user_id: &str,
    online: bool,
) -> Result<(), SignalingError> {
    let db = db.clone();
    let user_id = user_id.to_string();

    tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| SignalingError::StorePoisoned)?;
        conn.execute(
            "UPDATE users SET is_online = ?2, updated_at = ?3 WHERE id = ?1",
            rusqlite::params![user_id, online as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    })
    .await?
}

/// Read back a user's online flag. Returns None for an unknown id.
pub async fn is_online(db: &DbPool, user_id: &str) -> Result<Option<bool>, SignalingError> {
    let db = db.clone();
    let user_id = user_id.to_string();

    tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| SignalingError::StorePoisoned)?;
        let flag = conn
            .query_row(
                "SELECT is_online FROM users WHERE id = ?1",
                rusqlite::params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .map(|v| v != 0);
        match flag {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    })
    .await?
}

/// Insert a user row. Provisioning seam for the account API; used by tests.
pub async fn create_user(
    db: &DbPool,
    user_id: &str,
    username: &str,
) -> Result<(), SignalingError> {
    let db = db.clone();
    let user_id = user_id.to_string();
    let username = username.to_string();

    tokio::task::spawn_blocking(move || {
        let conn = db.lock().map_err(|_| SignalingError::StorePoisoned)?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO users (id, username, is_online, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)",
            rusqlite::params![user_id, username, now],
        )?;
        Ok(())
    })
    .await?
}
