//! The per-key lock state record and its pure transition functions.
//!
//! One [`LockRecord`] is stored as JSON under `warden:lock:{key}` and only
//! ever rewritten through compare-and-swap, so every transition here is
//! applied to a snapshot and committed atomically by the coordinator.
//! Leases live inside the record (not as store TTLs) so a fair queue
//! survives the expiry of the current holder; stale holders and abandoned
//! queue entries are pruned lazily by whichever contender reads the record
//! next.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue entries older than this are considered abandoned and pruned.
/// Live waiters refresh their entry on every acquisition attempt, which
/// happens at least once per fallback retry interval.
pub const QUEUE_STALE_AFTER_SECS: i64 = 30;

/// A live waiter's queue entry is re-stamped only once it is older than
/// this, so steady retries do not rewrite the record (and wake every other
/// waiter) on each attempt.
const QUEUE_REFRESH_SECS: i64 = 5;

/// Hold bookkeeping for one holder (exclusive or reader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderState {
    /// Reentrant hold count; the holder is released when this reaches zero.
    pub holds: u32,
    /// Lease expiry; `None` only while a watchdog keeps renewing.
    pub lease_expires_at: Option<DateTime<Utc>>,
}

impl HolderState {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.lease_expires_at.is_some_and(|at| at <= now)
    }
}

/// The exclusive holder slot (reentrant, fair, and write locks).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerState {
    /// String form of the holder's owner token.
    pub token: String,
    #[serde(flatten)]
    pub state: HolderState,
}

/// A fair-lock waiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub token: String,
    /// Refreshed by the waiter on every attempt; used to prune abandoned
    /// entries.
    pub enqueued_at: DateTime<Utc>,
}

/// Outcome of a release transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The holder's last hold was dropped; the slot is free.
    Released,
    /// The holder still holds the lock (remaining hold count).
    StillHeld(u32),
    /// The given token does not hold the lock. Advisory locking: the caller
    /// logs and absorbs this, it never corrupts state for real holders.
    NotHolder,
}

/// Full lock state for one key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LockRecord {
    /// Exclusive holder, if any. Mutually exclusive with `readers`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerState>,
    /// Concurrent read holders, keyed by owner token string.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub readers: BTreeMap<String, HolderState>,
    /// FIFO queue of fair-lock waiters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue: Vec<QueueEntry>,
}

impl LockRecord {
    /// Parse a stored record.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("lock record serialization cannot fail")
    }

    /// Nothing holds or waits on this key; the store entry can be deleted.
    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.readers.is_empty() && self.queue.is_empty()
    }

    /// Drop expired holders and abandoned queue entries. Returns `true` if
    /// anything changed (the caller should commit the pruned record even
    /// when its own acquisition fails, so stale state does not linger).
    pub fn prune(&mut self, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if self.owner.as_ref().is_some_and(|o| o.state.is_expired(now)) {
            self.owner = None;
            changed = true;
        }

        let stale_readers: Vec<String> = self
            .readers
            .iter()
            .filter(|(_, s)| s.is_expired(now))
            .map(|(t, _)| t.clone())
            .collect();
        for token in stale_readers {
            self.readers.remove(&token);
            changed = true;
        }

        let queue_cutoff = now - chrono::Duration::seconds(QUEUE_STALE_AFTER_SECS);
        let before = self.queue.len();
        self.queue.retain(|e| e.enqueued_at > queue_cutoff);
        changed |= self.queue.len() != before;

        changed
    }

    /// The earliest instant at which a current holder's lease expires, used
    /// by waiters to bound how long they sleep between attempts.
    pub fn next_lease_expiry(&self) -> Option<DateTime<Utc>> {
        let owner_expiry = self.owner.as_ref().and_then(|o| o.state.lease_expires_at);
        let reader_expiry = self
            .readers
            .values()
            .filter_map(|s| s.lease_expires_at)
            .min();
        match (owner_expiry, reader_expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // -----------------------------------------------------------------------
    // Exclusive acquisition (reentrant / fair / write)
    // -----------------------------------------------------------------------

    /// Try to take (or re-enter) the exclusive slot.
    ///
    /// With `fair`, a free lock is only granted to the head of the queue;
    /// anyone else is enqueued (or their entry refreshed) and refused.
    /// Without `fair`, the queue is ignored and grant order is unspecified.
    pub fn try_acquire_exclusive(
        &mut self,
        token: &str,
        fair: bool,
        lease_expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(owner) = &mut self.owner {
            if owner.token == token {
                // Reentrant re-acquisition by the current holder.
                owner.state.holds += 1;
                owner.state.lease_expires_at = lease_expires_at;
                return true;
            }
            if fair {
                self.enqueue_or_refresh(token, now);
            }
            return false;
        }

        if !self.readers.is_empty() {
            // Readers exclude any writer.
            if fair {
                self.enqueue_or_refresh(token, now);
            }
            return false;
        }

        if fair {
            match self.queue.first() {
                Some(head) if head.token != token => {
                    // Not our turn yet.
                    self.enqueue_or_refresh(token, now);
                    return false;
                }
                _ => self.remove_from_queue(token),
            }
        }

        self.owner = Some(OwnerState {
            token: token.to_string(),
            state: HolderState {
                holds: 1,
                lease_expires_at,
            },
        });
        true
    }

    /// Release one exclusive hold.
    pub fn release_exclusive(&mut self, token: &str) -> ReleaseOutcome {
        match &mut self.owner {
            Some(owner) if owner.token == token => {
                owner.state.holds = owner.state.holds.saturating_sub(1);
                if owner.state.holds == 0 {
                    self.owner = None;
                    ReleaseOutcome::Released
                } else {
                    ReleaseOutcome::StillHeld(owner.state.holds)
                }
            }
            _ => ReleaseOutcome::NotHolder,
        }
    }

    /// Re-arm the exclusive holder's lease (watchdog renewal).
    pub fn renew_exclusive(&mut self, token: &str, lease_expires_at: DateTime<Utc>) -> bool {
        match &mut self.owner {
            Some(owner) if owner.token == token => {
                owner.state.lease_expires_at = Some(lease_expires_at);
                true
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Read acquisition
    // -----------------------------------------------------------------------

    /// Try to take (or re-enter) a read hold. Readers are admitted whenever
    /// no exclusive holder is present.
    pub fn try_acquire_read(
        &mut self,
        token: &str,
        lease_expires_at: Option<DateTime<Utc>>,
    ) -> bool {
        if self.owner.is_some() {
            return false;
        }
        let state = self.readers.entry(token.to_string()).or_insert(HolderState {
            holds: 0,
            lease_expires_at,
        });
        state.holds += 1;
        state.lease_expires_at = lease_expires_at;
        true
    }

    /// Release one read hold.
    pub fn release_read(&mut self, token: &str) -> ReleaseOutcome {
        match self.readers.get_mut(token) {
            Some(state) => {
                state.holds = state.holds.saturating_sub(1);
                let remaining = state.holds;
                if remaining == 0 {
                    self.readers.remove(token);
                    ReleaseOutcome::Released
                } else {
                    ReleaseOutcome::StillHeld(remaining)
                }
            }
            None => ReleaseOutcome::NotHolder,
        }
    }

    /// Re-arm a reader's lease (watchdog renewal).
    pub fn renew_read(&mut self, token: &str, lease_expires_at: DateTime<Utc>) -> bool {
        match self.readers.get_mut(token) {
            Some(state) => {
                state.lease_expires_at = Some(lease_expires_at);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Fair queue
    // -----------------------------------------------------------------------

    fn enqueue_or_refresh(&mut self, token: &str, now: DateTime<Utc>) {
        match self.queue.iter_mut().find(|e| e.token == token) {
            Some(entry) => {
                if now - entry.enqueued_at > chrono::Duration::seconds(QUEUE_REFRESH_SECS) {
                    entry.enqueued_at = now;
                }
            }
            None => self.queue.push(QueueEntry {
                token: token.to_string(),
                enqueued_at: now,
            }),
        }
    }

    /// Remove a waiter that gave up (timeout or cancellation).
    pub fn remove_from_queue(&mut self, token: &str) {
        self.queue.retain(|e| e.token != token);
    }
}
