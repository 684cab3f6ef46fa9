//! The pairing pool: users waiting to be randomly matched.
//!
//! One type backs both protocol variants. The "queue" entry points use a
//! pool that dedupes joins by user id; the "waiting room" entry points use
//! a pool that admits duplicates but additionally skips the joiner's own
//! connection during the match scan. Entries are kept in insertion order
//! and the match is always the earliest eligible entry.

use std::sync::Mutex;

/// One user currently seeking a random peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingEntry {
    pub connection_id: String,
    pub user_id: String,
    pub username: String,
}

/// How a pool treats a joiner that is already (or might already be) waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPolicy {
    /// At most one entry per user id; a repeat join while waiting is a no-op.
    DedupeByUserId,
    /// No duplicate check on join. The match scan skips entries with the
    /// joiner's user id or connection id, so a double-joined user can sit in
    /// the pool twice but never gets matched with itself.
    AllowDuplicates,
}

/// Result of a join: either an immediate partner or a spot in the pool.
#[derive(Debug)]
pub enum JoinOutcome {
    /// The earliest eligible waiter, already removed from the pool.
    Matched(WaitingEntry),
    /// No eligible partner; the joiner is now waiting.
    Waiting,
    /// Join was a duplicate under `DedupeByUserId`; pool unchanged.
    AlreadyWaiting,
}

/// A pool of users awaiting random pairing.
///
/// The scan-and-remove in `join` must be atomic with respect to concurrent
/// joins or two joiners could claim the same partner; the mutex is held only
/// for the synchronous scan and never across an await point.
#[derive(Debug)]
pub struct PairingPool {
    policy: JoinPolicy,
    entries: Mutex<Vec<WaitingEntry>>,
}

impl PairingPool {
    pub fn new(policy: JoinPolicy) -> Self {
        Self {
            policy,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Try to match the joiner against the earliest eligible waiter;
    /// otherwise append it to the pool.
    pub fn join(&self, entry: WaitingEntry) -> JoinOutcome {
        let mut entries = self.entries.lock().expect("pairing pool lock");

        if self.policy == JoinPolicy::DedupeByUserId
            && entries.iter().any(|e| e.user_id == entry.user_id)
        {
            return JoinOutcome::AlreadyWaiting;
        }

        let partner = entries.iter().position(|e| match self.policy {
            JoinPolicy::DedupeByUserId => e.user_id != entry.user_id,
            JoinPolicy::AllowDuplicates => {
                e.user_id != entry.user_id && e.connection_id != entry.connection_id
            }
        });

        match partner {
            Some(index) => JoinOutcome::Matched(entries.remove(index)),
            None => {
                entries.push(entry);
                JoinOutcome::Waiting
            }
        }
    }

    /// Remove the first entry for a user id. Idempotent; absent is fine.
    pub fn leave(&self, user_id: &str) -> bool {
        let mut entries = self.entries.lock().expect("pairing pool lock");
        match entries.iter().position(|e| e.user_id == user_id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the first entry owned by a connection (disconnect cleanup).
    pub fn remove_connection(&self, connection_id: &str) -> Option<WaitingEntry> {
        let mut entries = self.entries.lock().expect("pairing pool lock");
        let index = entries
            .iter()
            .position(|e| e.connection_id == connection_id)?;
        Some(entries.remove(index))
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.entries
            .lock()
            .expect("pairing pool lock")
            .iter()
            .any(|e| e.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("pairing pool lock").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
