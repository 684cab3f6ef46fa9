use thiserror::Error;

/// Failures scoped to a single request or connection.
///
/// Nothing in this taxonomy is fatal to the process: store errors suppress
/// a presence broadcast, malformed frames earn the sender an `error` event,
/// and everything else is a silent no-op.
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("account store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("account store lock poisoned")]
    StorePoisoned,

    #[error("account store task aborted: {0}")]
    StoreTask(#[from] tokio::task::JoinError),

    #[error("message is missing required field: {0}")]
    MissingField(&'static str),
}
