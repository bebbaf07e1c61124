//! The declarative lock specification and the guarded-execution wrapper.
//!
//! [`LockSpec`] carries the same fields service methods declare at their
//! call sites (key or key expression, wait/lease in seconds with the `0`
//! and `-1` sentinels, kind, fairness); [`LockCoordinator::with_lock`] is
//! the interception layer: it derives the key, acquires, runs the guarded
//! operation, and releases on every exit path.

use std::future::Future;

use serde::{Deserialize, Serialize};
use warden_core::error::LockError;

use crate::coordinator::{LeasePolicy, LockCoordinator, LockKind, WaitPolicy};
use crate::keyexpr::{self, LockContext};

/// Default wait budget in seconds.
const DEFAULT_WAIT_SECS: i64 = 10;

/// Default lease in seconds (`-1` selects the watchdog).
const DEFAULT_LEASE_SECS: i64 = 30;

/// Declarative lock requirements for one guarded operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSpec {
    /// Literal lock key; used when `key_expression` is absent.
    pub key: String,
    /// Expression deriving the key from call arguments, e.g.
    /// `'account:' + #from + ':to:' + #to`. Takes precedence over `key`.
    pub key_expression: Option<String>,
    /// Seconds to queue for the lock: `0` = fail immediately, negative =
    /// wait indefinitely.
    pub wait_secs: i64,
    /// Seconds the lock is held before automatic release; `-1` = renewed by
    /// the watchdog until release.
    pub lease_secs: i64,
    pub kind: LockKind,
    /// Upgrades a [`LockKind::Reentrant`] spec to the fair lock.
    pub fair: bool,
}

impl Default for LockSpec {
    fn default() -> Self {
        Self {
            key: String::new(),
            key_expression: None,
            wait_secs: DEFAULT_WAIT_SECS,
            lease_secs: DEFAULT_LEASE_SECS,
            kind: LockKind::default(),
            fair: false,
        }
    }
}

impl LockSpec {
    /// Spec with a literal key and all defaults.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Spec whose key is derived from call arguments.
    pub fn with_expression(expression: impl Into<String>) -> Self {
        Self {
            key_expression: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn wait_secs(mut self, secs: i64) -> Self {
        self.wait_secs = secs;
        self
    }

    pub fn lease_secs(mut self, secs: i64) -> Self {
        self.lease_secs = secs;
        self
    }

    pub fn kind(mut self, kind: LockKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn fair(mut self, fair: bool) -> Self {
        self.fair = fair;
        self
    }

    /// The kind actually acquired: `fair = true` upgrades the default
    /// reentrant kind, every other kind is taken as declared.
    pub fn effective_kind(&self) -> LockKind {
        match self.kind {
            LockKind::Reentrant if self.fair => LockKind::Fair,
            kind => kind,
        }
    }

    /// Resolve the lock key for one invocation.
    pub fn resolve_key(&self, ctx: &LockContext) -> Result<String, LockError> {
        match &self.key_expression {
            Some(expression) => keyexpr::evaluate(expression, ctx)
                .map_err(|e| LockError::KeyExpression(e.to_string())),
            None if self.key.is_empty() => {
                Err(LockError::KeyExpression("empty lock key".to_string()))
            }
            None => Ok(self.key.clone()),
        }
    }
}

impl LockCoordinator {
    /// Run `op` under the lock described by `spec`.
    ///
    /// The key is derived first (expression over `ctx`, else the literal).
    /// If the lock cannot be acquired within the spec's wait budget, `op`
    /// is never invoked and [`LockError::LockUnavailable`] is returned.
    /// On success `op` runs, and the lock is released exactly once on every
    /// exit path; `op`'s own error is propagated untouched after release.
    pub async fn with_lock<F, Fut, T, E>(
        &self,
        spec: &LockSpec,
        ctx: &LockContext,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<LockError>,
    {
        let key = spec.resolve_key(ctx).map_err(E::from)?;
        let owner = self.owner();

        let guard = self
            .try_acquire(
                &key,
                spec.effective_kind(),
                &owner,
                WaitPolicy::from_secs(spec.wait_secs),
                LeasePolicy::from_secs(spec.lease_secs),
            )
            .await
            .map_err(|e| {
                tracing::warn!(key, error = %e, "guarded operation refused: lock not acquired");
                E::from(match e {
                    LockError::AcquireTimedOut { key } => LockError::LockUnavailable { key },
                    other => other,
                })
            })?;

        // The guard's drop hook covers cancellation of `op`; the explicit
        // release below covers both the normal and error returns.
        let result = op().await;
        guard.release().await;
        result
    }
}
