//! Cross-instance lock acquisition, release, and lease management.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use warden_core::error::{LockError, StoreError};
use warden_store::{SharedStore, StoreEvent};

use crate::record::{LockRecord, ReleaseOutcome};

/// Prefix for lock records in the shared store.
const LOCK_KEY_PREFIX: &str = "warden:lock:";

/// Bounded retries for release/abandon CAS loops. Contention on a single
/// record is short-lived; if we lose this many races in a row something is
/// wrong enough that logging beats spinning.
const MUTATE_RETRY_LIMIT: u32 = 16;

// ---------------------------------------------------------------------------
// Public enums
// ---------------------------------------------------------------------------

/// The lock semantics to acquire with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockKind {
    /// Reentrant exclusive lock, no ordering guarantee among waiters.
    #[default]
    Reentrant,
    /// Reentrant exclusive lock serving waiters strictly in arrival order.
    Fair,
    /// Shared read side of a read/write pair.
    Read,
    /// Exclusive write side of a read/write pair.
    Write,
}

/// How long to queue for an unavailable lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Fail immediately if the lock is unavailable.
    NoWait,
    /// Queue for at most this long.
    Timeout(Duration),
    /// Queue until the lock is granted (or the caller is cancelled).
    Forever,
}

impl WaitPolicy {
    /// Mapping used by the declarative layer: `0` = no wait, negative =
    /// wait forever, positive = bounded wait in seconds.
    pub fn from_secs(secs: i64) -> Self {
        match secs {
            0 => WaitPolicy::NoWait,
            s if s < 0 => WaitPolicy::Forever,
            s => WaitPolicy::Timeout(Duration::from_secs(s as u64)),
        }
    }
}

/// How long the lock may be held before automatic expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeasePolicy {
    /// Expires after the given duration unless released first.
    Fixed(Duration),
    /// Renewed by a background watchdog task for as long as the holding
    /// process is alive; the safety escape hatch for long critical sections
    /// that must not expire mid-flight.
    Watchdog,
}

impl LeasePolicy {
    /// Mapping used by the declarative layer: `-1` = watchdog, otherwise a
    /// fixed lease in seconds.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            LeasePolicy::Watchdog
        } else {
            LeasePolicy::Fixed(Duration::from_secs(secs as u64))
        }
    }
}

/// Identity of a lock holder: the process instance plus a per-acquisition
/// nonce, so a release can never be applied on behalf of a different holder.
///
/// Reentrancy is keyed on this token: re-acquiring with the same token
/// increments the hold count instead of blocking.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerToken {
    pub instance: Uuid,
    pub nonce: u64,
}

impl std::fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.instance, self.nonce)
    }
}

/// Whether a guard holds the exclusive slot or a read hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LockMode {
    Exclusive,
    Read,
}

impl LockKind {
    pub(crate) fn mode(self) -> LockMode {
        match self {
            LockKind::Read => LockMode::Read,
            _ => LockMode::Exclusive,
        }
    }

    pub(crate) fn is_fair(self) -> bool {
        matches!(self, LockKind::Fair)
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tuning knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Rolling lease written by watchdog-mode holders; renewed at a third of
    /// this interval.
    pub watchdog_lease: Duration,
    /// Fallback retry interval for waiters, covering leases that expire
    /// without a store event.
    pub retry_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            watchdog_lease: Duration::from_secs(30),
            retry_interval: Duration::from_millis(100),
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Outcome of one acquisition attempt against the current record snapshot.
enum Attempt {
    Acquired,
    /// The lock is held by someone else; wake no later than the returned
    /// lease expiry.
    Conflict(Option<DateTime<Utc>>),
    /// Lost a CAS race; retry immediately.
    Race,
}

/// Named advisory locks shared across service instances through the store.
///
/// The coordinator itself is stateless: every operation round-trips the
/// store, so any number of instances can run concurrently without affinity.
pub struct LockCoordinator {
    store: Arc<dyn SharedStore>,
    instance: Uuid,
    nonce: AtomicU64,
    config: LockConfig,
}

impl LockCoordinator {
    pub fn new(store: Arc<dyn SharedStore>) -> Self {
        Self::with_config(store, LockConfig::default())
    }

    pub fn with_config(store: Arc<dyn SharedStore>, config: LockConfig) -> Self {
        Self {
            store,
            instance: Uuid::new_v4(),
            nonce: AtomicU64::new(0),
            config,
        }
    }

    /// Mint a fresh holder identity for one logical acquisition scope.
    pub fn owner(&self) -> OwnerToken {
        OwnerToken {
            instance: self.instance,
            nonce: self.nonce.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn store_key(key: &str) -> String {
        format!("{LOCK_KEY_PREFIX}{key}")
    }

    /// Acquire `key` with the given semantics, queuing per `wait`.
    ///
    /// Returns [`LockError::AcquireTimedOut`] when the wait budget elapses
    /// (immediately for [`WaitPolicy::NoWait`]). The returned guard releases
    /// on [`LockGuard::release`] or, best-effort, on drop.
    pub async fn try_acquire(
        &self,
        key: &str,
        kind: LockKind,
        owner: &OwnerToken,
        wait: WaitPolicy,
        lease: LeasePolicy,
    ) -> Result<LockGuard, LockError> {
        self.acquire_inner(key, kind, owner, wait, lease, &CancellationToken::new())
            .await
    }

    /// Like [`try_acquire`](Self::try_acquire) but abandons the wait with
    /// [`LockError::AcquireInterrupted`] when `cancel` fires. Interruption
    /// never leaves a partially-acquired state behind.
    pub async fn try_acquire_with_cancel(
        &self,
        key: &str,
        kind: LockKind,
        owner: &OwnerToken,
        wait: WaitPolicy,
        lease: LeasePolicy,
        cancel: &CancellationToken,
    ) -> Result<LockGuard, LockError> {
        self.acquire_inner(key, kind, owner, wait, lease, cancel).await
    }

    async fn acquire_inner(
        &self,
        key: &str,
        kind: LockKind,
        owner: &OwnerToken,
        wait: WaitPolicy,
        lease: LeasePolicy,
        cancel: &CancellationToken,
    ) -> Result<LockGuard, LockError> {
        let store_key = Self::store_key(key);
        let token = owner.to_string();
        let mode = kind.mode();
        let deadline = match wait {
            WaitPolicy::Timeout(d) => Some(Instant::now() + d),
            _ => None,
        };

        // Subscribe before the first attempt so a release between attempt
        // and wait cannot be missed.
        let mut events = self.store.subscribe();

        loop {
            if cancel.is_cancelled() {
                self.abandon_fair_wait(&store_key, kind, &token).await;
                return Err(LockError::AcquireInterrupted {
                    key: key.to_string(),
                });
            }

            match self.attempt(&store_key, mode, kind.is_fair(), &token, lease).await? {
                Attempt::Acquired => {
                    tracing::debug!(key, %owner, "lock acquired");
                    let watchdog = match lease {
                        LeasePolicy::Watchdog => {
                            Some(self.spawn_watchdog(store_key.clone(), mode, token.clone()))
                        }
                        LeasePolicy::Fixed(_) => None,
                    };
                    return Ok(LockGuard {
                        store: Arc::clone(&self.store),
                        store_key,
                        key: key.to_string(),
                        mode,
                        token,
                        watchdog,
                        released: false,
                    });
                }
                Attempt::Race => continue,
                Attempt::Conflict(next_expiry) => {
                    if matches!(wait, WaitPolicy::NoWait) {
                        self.abandon_fair_wait(&store_key, kind, &token).await;
                        return Err(LockError::AcquireTimedOut {
                            key: key.to_string(),
                        });
                    }

                    // Sleep until a store event on this key, the next lease
                    // expiry, the retry tick, or the deadline -- whichever
                    // comes first.
                    let mut slice = self.config.retry_interval;
                    if let Some(expiry) = next_expiry {
                        if let Ok(until) = (expiry - Utc::now()).to_std() {
                            slice = slice.min(until.max(Duration::from_millis(5)));
                        }
                    }
                    if let Some(deadline) = deadline {
                        let remaining = deadline.saturating_duration_since(Instant::now());
                        if remaining.is_zero() {
                            self.abandon_fair_wait(&store_key, kind, &token).await;
                            return Err(LockError::AcquireTimedOut {
                                key: key.to_string(),
                            });
                        }
                        slice = slice.min(remaining);
                    }

                    if !self
                        .wait_for_event(&mut events, &store_key, slice, cancel)
                        .await
                    {
                        self.abandon_fair_wait(&store_key, kind, &token).await;
                        return Err(LockError::AcquireInterrupted {
                            key: key.to_string(),
                        });
                    }
                }
            }
        }
    }

    /// Apply one acquisition attempt to the current record snapshot and try
    /// to commit it.
    async fn attempt(
        &self,
        store_key: &str,
        mode: LockMode,
        fair: bool,
        token: &str,
        lease: LeasePolicy,
    ) -> Result<Attempt, LockError> {
        let now = Utc::now();
        let lease_expires_at = match lease {
            LeasePolicy::Fixed(d) => Some(now + chrono::Duration::from_std(d).unwrap_or_default()),
            // The watchdog renews from here on; the initial lease bounds the
            // window in which a crash before the first renewal would wedge
            // the lock.
            LeasePolicy::Watchdog => {
                Some(now + chrono::Duration::from_std(self.config.watchdog_lease).unwrap_or_default())
            }
        };

        match self.store.get(store_key).await? {
            None => {
                let mut rec = LockRecord::default();
                let acquired = match mode {
                    LockMode::Exclusive => {
                        rec.try_acquire_exclusive(token, fair, lease_expires_at, now)
                    }
                    LockMode::Read => rec.try_acquire_read(token, lease_expires_at),
                };
                debug_assert!(acquired, "an empty record always grants");
                if self
                    .store
                    .put_if_absent(store_key, &rec.to_json(), None)
                    .await?
                {
                    Ok(Attempt::Acquired)
                } else {
                    Ok(Attempt::Race)
                }
            }
            Some(raw) => {
                let mut rec = LockRecord::parse(&raw)
                    .map_err(|e| StoreError::Payload(format!("lock record: {e}")))?;
                rec.prune(now);
                let acquired = match mode {
                    LockMode::Exclusive => {
                        rec.try_acquire_exclusive(token, fair, lease_expires_at, now)
                    }
                    LockMode::Read => rec.try_acquire_read(token, lease_expires_at),
                };

                let new_raw = rec.to_json();
                if new_raw == raw {
                    // No change to commit (held by others, nothing pruned).
                    return Ok(Attempt::Conflict(rec.next_lease_expiry()));
                }

                let committed = if rec.is_empty() {
                    self.store.compare_and_delete(store_key, &raw).await?
                } else {
                    self.store
                        .compare_and_swap(store_key, &raw, &new_raw, None)
                        .await?
                };
                match (committed, acquired) {
                    (true, true) => Ok(Attempt::Acquired),
                    (true, false) => Ok(Attempt::Conflict(rec.next_lease_expiry())),
                    (false, _) => Ok(Attempt::Race),
                }
            }
        }
    }

    /// Block until a store event for `key` arrives or `max` elapses.
    /// Returns `false` if `cancel` fired instead.
    async fn wait_for_event(
        &self,
        events: &mut broadcast::Receiver<StoreEvent>,
        key: &str,
        max: Duration,
        cancel: &CancellationToken,
    ) -> bool {
        let deadline = Instant::now() + max;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return true;
            }
            tokio::select! {
                _ = cancel.cancelled() => return false,
                recv = tokio::time::timeout(remaining, events.recv()) => match recv {
                    Ok(Ok(event)) if event.key == key => return true,
                    Ok(Ok(_)) => continue,
                    // Lagged: events were dropped, one of them may have been
                    // ours -- re-attempt right away.
                    Ok(Err(broadcast::error::RecvError::Lagged(_))) => return true,
                    Ok(Err(broadcast::error::RecvError::Closed)) => {
                        tokio::time::sleep(remaining).await;
                        return true;
                    }
                    Err(_) => return true,
                },
            }
        }
    }

    /// Best-effort removal of our fair-queue entry when giving up a wait.
    async fn abandon_fair_wait(&self, store_key: &str, kind: LockKind, token: &str) {
        if !kind.is_fair() {
            return;
        }
        for _ in 0..MUTATE_RETRY_LIMIT {
            let raw = match self.store.get(store_key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read lock record while leaving queue");
                    return;
                }
            };
            let mut rec = match LockRecord::parse(&raw) {
                Ok(rec) => rec,
                Err(e) => {
                    tracing::warn!(error = %e, "unparseable lock record while leaving queue");
                    return;
                }
            };
            rec.remove_from_queue(token);
            let new_raw = rec.to_json();
            if new_raw == raw {
                return;
            }
            let committed = if rec.is_empty() {
                self.store.compare_and_delete(store_key, &raw).await
            } else {
                self.store.compare_and_swap(store_key, &raw, &new_raw, None).await
            };
            match committed {
                Ok(true) => return,
                Ok(false) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to leave lock queue");
                    return;
                }
            }
        }
        tracing::warn!(store_key, "gave up removing fair-queue entry after repeated races");
    }

    // -----------------------------------------------------------------------
    // Multi-lock
    // -----------------------------------------------------------------------

    /// Acquire several keys all-or-nothing, in the order given, sharing one
    /// wait budget.
    ///
    /// On any failure the already-acquired subset is released in reverse
    /// order before the error is returned, so no partial hold survives.
    /// Deadlock avoidance across call sites (consistent key ordering) is the
    /// caller's responsibility.
    pub async fn try_acquire_multi(
        &self,
        keys: &[&str],
        kind: LockKind,
        owner: &OwnerToken,
        wait: WaitPolicy,
        lease: LeasePolicy,
    ) -> Result<MultiLockGuard, LockError> {
        let deadline = match wait {
            WaitPolicy::Timeout(d) => Some(Instant::now() + d),
            _ => None,
        };
        let mut guards: Vec<LockGuard> = Vec::with_capacity(keys.len());

        for key in keys {
            let step_wait = match (wait, deadline) {
                (WaitPolicy::Timeout(_), Some(deadline)) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        release_all(guards).await;
                        return Err(LockError::AcquireTimedOut {
                            key: key.to_string(),
                        });
                    }
                    WaitPolicy::Timeout(remaining)
                }
                (other, _) => other,
            };

            match self.try_acquire(key, kind, owner, step_wait, lease).await {
                Ok(guard) => guards.push(guard),
                Err(e) => {
                    release_all(guards).await;
                    return Err(e);
                }
            }
        }

        Ok(MultiLockGuard { guards })
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Whether any holder (exclusive or reader) currently holds `key`.
    pub async fn is_locked(&self, key: &str) -> Result<bool, LockError> {
        Ok(self
            .read_record(key)
            .await?
            .is_some_and(|rec| rec.owner.is_some() || !rec.readers.is_empty()))
    }

    /// The exclusive holder's reentrant hold count (`0` when free or
    /// read-held).
    pub async fn hold_count(&self, key: &str) -> Result<u32, LockError> {
        Ok(self
            .read_record(key)
            .await?
            .and_then(|rec| rec.owner.map(|o| o.state.holds))
            .unwrap_or(0))
    }

    /// Time until the earliest current lease expires, if any holder carries
    /// a fixed lease.
    pub async fn remaining_lease(&self, key: &str) -> Result<Option<Duration>, LockError> {
        Ok(self
            .read_record(key)
            .await?
            .and_then(|rec| rec.next_lease_expiry())
            .and_then(|at| (at - Utc::now()).to_std().ok()))
    }

    /// Drop the lock record regardless of holders. For operator tooling
    /// only; waiters observe the deletion and contend normally.
    pub async fn force_unlock(&self, key: &str) -> Result<bool, LockError> {
        tracing::warn!(key, "force-unlocking");
        Ok(self.store.delete(&Self::store_key(key)).await?)
    }

    async fn read_record(&self, key: &str) -> Result<Option<LockRecord>, LockError> {
        let now = Utc::now();
        match self.store.get(&Self::store_key(key)).await? {
            None => Ok(None),
            Some(raw) => {
                let mut rec = LockRecord::parse(&raw)
                    .map_err(|e| StoreError::Payload(format!("lock record: {e}")))?;
                rec.prune(now);
                Ok(Some(rec))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Watchdog
    // -----------------------------------------------------------------------

    fn spawn_watchdog(&self, store_key: String, mode: LockMode, token: String) -> Watchdog {
        let cancel = CancellationToken::new();
        let store = Arc::clone(&self.store);
        let lease = self.config.watchdog_lease;
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(lease / 3);
            // The first tick completes immediately; the lock was just
            // written with a fresh lease.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    _ = interval.tick() => {
                        if !renew(store.as_ref(), &store_key, mode, &token, lease).await {
                            tracing::warn!(store_key, "watchdog stopping: no longer the holder");
                            break;
                        }
                    }
                }
            }
        });

        Watchdog { cancel, handle }
    }
}

/// Re-arm the holder's lease. Returns `false` when the holder is gone (the
/// watchdog should stop).
async fn renew(
    store: &dyn SharedStore,
    store_key: &str,
    mode: LockMode,
    token: &str,
    lease: Duration,
) -> bool {
    for _ in 0..MUTATE_RETRY_LIMIT {
        let raw = match store.get(store_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                // Transient store trouble: keep the watchdog alive, the
                // next tick retries.
                tracing::warn!(error = %e, "watchdog renewal read failed");
                return true;
            }
        };
        let mut rec = match LockRecord::parse(&raw) {
            Ok(rec) => rec,
            Err(e) => {
                tracing::warn!(error = %e, "watchdog found unparseable lock record");
                return false;
            }
        };
        let expiry = Utc::now() + chrono::Duration::from_std(lease).unwrap_or_default();
        let renewed = match mode {
            LockMode::Exclusive => rec.renew_exclusive(token, expiry),
            LockMode::Read => rec.renew_read(token, expiry),
        };
        if !renewed {
            return false;
        }
        match store.compare_and_swap(store_key, &raw, &rec.to_json(), None).await {
            Ok(true) => return true,
            Ok(false) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "watchdog renewal write failed");
                return true;
            }
        }
    }
    tracing::warn!(store_key, "watchdog renewal kept losing races");
    true
}

struct Watchdog {
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// A held lock. Release explicitly with [`LockGuard::release`]; dropping an
/// unreleased guard spawns a best-effort asynchronous release so no exit
/// path (normal, error, or cancellation) leaks the hold.
pub struct LockGuard {
    store: Arc<dyn SharedStore>,
    store_key: String,
    key: String,
    mode: LockMode,
    token: String,
    watchdog: Option<Watchdog>,
    released: bool,
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}

impl LockGuard {
    /// The logical lock key this guard holds.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release one hold. Never fails the caller: release anomalies
    /// (double release, not the holder) are logged and absorbed.
    pub async fn release(mut self) {
        self.released = true;
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel.cancel();
            let _ = watchdog.handle.await;
        }
        release_once(self.store.as_ref(), &self.store_key, self.mode, &self.token).await;
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Some(watchdog) = self.watchdog.take() {
            watchdog.cancel.cancel();
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let store = Arc::clone(&self.store);
                let store_key = std::mem::take(&mut self.store_key);
                let token = std::mem::take(&mut self.token);
                let mode = self.mode;
                handle.spawn(async move {
                    release_once(store.as_ref(), &store_key, mode, &token).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    key = %self.key,
                    "lock guard dropped outside a runtime; lease expiry will reclaim it"
                );
            }
        }
    }
}

/// Apply one release to the stored record. All failure modes are logged and
/// absorbed per the advisory-locking contract.
async fn release_once(store: &dyn SharedStore, store_key: &str, mode: LockMode, token: &str) {
    for _ in 0..MUTATE_RETRY_LIMIT {
        let raw = match store.get(store_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(store_key, "release: lock record already gone");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, store_key, "release: store read failed");
                return;
            }
        };
        let mut rec = match LockRecord::parse(&raw) {
            Ok(rec) => rec,
            Err(e) => {
                tracing::error!(error = %e, store_key, "release: unparseable lock record");
                return;
            }
        };
        let outcome = match mode {
            LockMode::Exclusive => rec.release_exclusive(token),
            LockMode::Read => rec.release_read(token),
        };
        if outcome == ReleaseOutcome::NotHolder {
            tracing::warn!(store_key, token, "release by non-holder ignored");
            return;
        }

        let committed = if rec.is_empty() {
            store.compare_and_delete(store_key, &raw).await
        } else {
            store.compare_and_swap(store_key, &raw, &rec.to_json(), None).await
        };
        match committed {
            Ok(true) => {
                tracing::debug!(store_key, ?outcome, "lock released");
                return;
            }
            Ok(false) => continue,
            Err(e) => {
                tracing::error!(error = %e, store_key, "release: store write failed");
                return;
            }
        }
    }
    tracing::warn!(store_key, "release kept losing races; lease expiry will reclaim the hold");
}

async fn release_all(guards: Vec<LockGuard>) {
    for guard in guards.into_iter().rev() {
        guard.release().await;
    }
}

/// Guard over an all-or-nothing composite acquisition.
pub struct MultiLockGuard {
    guards: Vec<LockGuard>,
}

impl std::fmt::Debug for MultiLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiLockGuard")
            .field("guards", &self.guards)
            .finish()
    }
}

impl MultiLockGuard {
    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Release all keys in reverse acquisition order.
    pub async fn release(self) {
        release_all(self.guards).await;
    }
}
