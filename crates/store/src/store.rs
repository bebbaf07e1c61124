//! The [`SharedStore`] trait and its change-event types.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use warden_core::error::StoreError;

/// Convenience alias for store operation results.
pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// What happened to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEventKind {
    /// The key was written (created or replaced).
    Put,
    /// The key was deleted explicitly.
    Removed,
    /// The key's TTL elapsed and it was purged.
    Expired,
}

/// A change notification for one key.
///
/// Lock waiters subscribe to these instead of busy-polling: a `Removed` or
/// `Expired` event on a lock key means the lock may now be free, a `Put`
/// means its queue or reader set changed.
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub key: String,
    pub kind: StoreEventKind,
}

// ---------------------------------------------------------------------------
// SharedStore
// ---------------------------------------------------------------------------

/// Narrow interface over the external session/lock store.
///
/// All mutating operations are atomic with respect to each other. Values are
/// opaque strings; callers serialize their own payloads.
#[async_trait]
pub trait SharedStore: Send + Sync + 'static {
    /// Read a value, treating an expired entry as absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Read a value together with its remaining TTL (`None` = no expiry).
    async fn get_with_ttl(&self, key: &str) -> StoreResult<Option<(String, Option<Duration>)>>;

    /// Write a value, replacing any existing one. `ttl = None` means the
    /// entry never expires on its own.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    /// Atomically write the value only if the key is currently absent.
    /// Returns `true` when the write happened.
    async fn put_if_absent(&self, key: &str, value: &str, ttl: Option<Duration>)
        -> StoreResult<bool>;

    /// Atomically replace the value only if the current value equals
    /// `expected`. The TTL is re-armed on success. Returns `true` when the
    /// swap happened.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Atomically delete the key only if the current value equals
    /// `expected`. Returns `true` when the delete happened.
    async fn compare_and_delete(&self, key: &str, expected: &str) -> StoreResult<bool>;

    /// Unconditionally delete the key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Re-arm the TTL of an existing key (lease renewal). Returns `false`
    /// if the key does not exist.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Subscribe to change events for all keys.
    ///
    /// Receivers that fall behind lose events (`broadcast` semantics), so
    /// waiters must pair this with a deadline-based retry rather than rely
    /// on every event arriving.
    fn subscribe(&self) -> broadcast::Receiver<StoreEvent>;
}
