//! Error taxonomy for the session and lock subsystems.
//!
//! Every failure that can cross the core boundary is a typed value here.
//! The HTTP layer maps each variant to a stable numeric code and message;
//! nothing below that layer depends on those codes.

/// A storage/transport failure from the shared session/lock store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored payload could not be serialized or deserialized.
    #[error("store payload error: {0}")]
    Payload(String),
}

/// Authentication and session failures.
///
/// These are never retried automatically and are always surfaced to the
/// caller as structured values. A namespace mismatch is reported as
/// [`AuthError::TokenInvalid`] so the response never identifies which
/// namespace a token actually belongs to.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The credential lookup returned no principal.
    #[error("principal not found")]
    PrincipalNotFound,

    /// The principal exists but its status forbids login.
    #[error("principal is disabled")]
    PrincipalDisabled,

    /// The supplied credentials did not verify.
    #[error("wrong credentials")]
    WrongCredentials,

    /// No session matches the presented token in this namespace.
    #[error("token is invalid")]
    TokenInvalid,

    /// The session exists but its expiry has passed.
    #[error("token has expired")]
    TokenExpired,

    /// The shared store failed while servicing the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Distributed-lock failures.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The wait budget elapsed before the lock became available.
    #[error("lock acquisition timed out: {key}")]
    AcquireTimedOut { key: String },

    /// The caller was interrupted/cancelled while queuing for the lock.
    /// No lock is held when this is returned.
    #[error("lock acquisition interrupted: {key}")]
    AcquireInterrupted { key: String },

    /// A lock-guarded operation was refused because the lock could not be
    /// taken; the guarded operation was never invoked.
    #[error("lock unavailable: {key}")]
    LockUnavailable { key: String },

    /// A dynamic lock-key expression failed to evaluate.
    #[error("lock key expression error: {0}")]
    KeyExpression(String),

    /// The shared store failed while servicing the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LockError {
    /// The lock key this error concerns, when one is known.
    pub fn key(&self) -> Option<&str> {
        match self {
            LockError::AcquireTimedOut { key }
            | LockError::AcquireInterrupted { key }
            | LockError::LockUnavailable { key } => Some(key),
            LockError::KeyExpression(_) | LockError::Store(_) => None,
        }
    }
}
