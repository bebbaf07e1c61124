//! In-memory [`SharedStore`] used by tests and single-node deployments.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::store::{SharedStore, StoreEvent, StoreEventKind, StoreResult};

/// Buffer capacity for the change-event broadcast channel.
const EVENT_CAPACITY: usize = 1024;

/// How often the background sweeper purges expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Single-process store with the same atomicity guarantees the trait
/// promises of a real backend: one mutex covers every mutation, so
/// conditional operations are linearizable.
///
/// Expired entries are dropped lazily on access; [`MemoryStore::spawn_sweeper`]
/// adds a background purge so waiters blocked on change events also learn
/// about expiry.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn emit(&self, key: &str, kind: StoreEventKind) {
        // No receivers is fine; broadcast::send only fails in that case.
        let _ = self.events.send(StoreEvent {
            key: key.to_string(),
            kind,
        });
    }

    /// Drop the entry for `key` if its TTL has elapsed. Must be called with
    /// the map locked, before any read or conditional check of `key`.
    fn purge_if_expired(&self, entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
            self.emit(key, StoreEventKind::Expired);
        }
    }

    /// Spawn the background task that purges expired entries every
    /// [`SWEEP_INTERVAL`] until `cancel` is triggered.
    pub fn spawn_sweeper(
        store: Arc<Self>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("store sweeper stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        store.sweep();
                    }
                }
            }
        })
    }

    fn sweep(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();
        for key in expired {
            entries.remove(&key);
            self.emit(&key, StoreEventKind::Expired);
        }
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn get_with_ttl(&self, key: &str) -> StoreResult<Option<(String, Option<Duration>)>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        Ok(entries.get(key).map(|e| {
            let ttl = e.expires_at.map(|at| at.saturating_duration_since(now));
            (e.value.clone(), ttl)
        }))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );
        drop(entries);
        self.emit(key, StoreEventKind::Put);
        Ok(())
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );
        drop(entries);
        self.emit(key, StoreEventKind::Put);
        Ok(true)
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &str,
        new: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        if !entries.get(key).is_some_and(|e| e.value == expected) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: new.to_string(),
                expires_at: ttl.map(|d| now + d),
            },
        );
        drop(entries);
        self.emit(key, StoreEventKind::Put);
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        if !entries.get(key).is_some_and(|e| e.value == expected) {
            return Ok(false);
        }
        entries.remove(key);
        drop(entries);
        self.emit(key, StoreEventKind::Removed);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        let existed = entries.remove(key).is_some();
        drop(entries);
        if existed {
            self.emit(key, StoreEventKind::Removed);
        }
        Ok(existed)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("store mutex poisoned");
        self.purge_if_expired(&mut entries, key, now);
        match entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
