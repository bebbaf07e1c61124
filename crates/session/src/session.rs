//! The session record and authority configuration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_core::types::{DeviceType, PrincipalId};

/// Default session lifetime: 30 days, renewed on every successful
/// validation.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 3600);

/// One active login, serialized as JSON into the shared store under
/// `warden:sess:{namespace}:{token}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque, unguessable, namespace-scoped token.
    pub token: String,
    pub principal_id: PrincipalId,
    pub device: DeviceType,
    pub issued_at: DateTime<Utc>,
    /// `None` = no fixed expiry (the session lives until revoked).
    pub expires_at: Option<DateTime<Utc>>,
    /// Refreshed on every successful validation.
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Per-namespace session rules.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sliding session lifetime; `None` disables expiry entirely.
    pub token_ttl: Option<Duration>,
    /// When set, a new login evicts the principal's previous session on the
    /// same device. All namespaces default to independent sessions per
    /// device.
    pub single_device: bool,
    /// Lifetime of the cached permission/role closure. Invalidated early on
    /// logout and on explicit role-change notification.
    pub permission_cache_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_ttl: Some(DEFAULT_TOKEN_TTL),
            single_device: false,
            permission_cache_ttl: DEFAULT_TOKEN_TTL,
        }
    }
}
