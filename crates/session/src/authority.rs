//! The per-namespace session authority.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use warden_core::error::{AuthError, StoreError};
use warden_core::permission::PermissionSet;
use warden_core::types::{CredentialLookup, DeviceType, Namespace, PrincipalId, PrincipalStatus};
use warden_store::SharedStore;

use crate::session::{Session, SessionConfig};
use crate::traits::PrincipalDirectory;

/// Length of generated session tokens.
const TOKEN_LEN: usize = 32;

/// How long an expired session record is retained past its logical expiry,
/// so validation can report "expired" rather than "invalid" for recently
/// dead tokens.
const EXPIRED_RETENTION: Duration = Duration::from_secs(60);

/// Issues, validates, renews, and revokes sessions for one namespace, and
/// resolves principals' permission/role closures through the directory
/// collaborator.
///
/// The authority holds no state of its own; every operation is one or two
/// round-trips to the shared store, so any instance can serve any request.
pub struct SessionAuthority {
    namespace: Namespace,
    store: Arc<dyn SharedStore>,
    directory: Arc<dyn PrincipalDirectory>,
    config: SessionConfig,
}

impl SessionAuthority {
    pub fn new(
        namespace: Namespace,
        store: Arc<dyn SharedStore>,
        directory: Arc<dyn PrincipalDirectory>,
        config: SessionConfig,
    ) -> Self {
        Self {
            namespace,
            store,
            directory,
            config,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    fn session_key(&self, token: &str) -> String {
        format!("warden:sess:{}:{}", self.namespace, token)
    }

    fn device_key(&self, principal_id: PrincipalId, device: DeviceType) -> String {
        format!("warden:sess:{}:dev:{}:{}", self.namespace, principal_id, device)
    }

    fn permission_key(&self, principal_id: PrincipalId) -> String {
        format!("warden:perm:{}:{}", self.namespace, principal_id)
    }

    /// Store TTL for a session entry: logical lifetime plus the retention
    /// window that keeps expired records distinguishable from unknown ones.
    fn store_ttl(&self) -> Option<Duration> {
        self.config.token_ttl.map(|ttl| ttl + EXPIRED_RETENTION)
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open a session for an already-verified principal.
    ///
    /// `lookup` is the credential collaborator's verified result; `None`
    /// means the lookup found nothing. Fails with
    /// [`AuthError::PrincipalNotFound`] / [`AuthError::PrincipalDisabled`]
    /// accordingly -- password checking never happens here.
    pub async fn login(
        &self,
        lookup: Option<CredentialLookup>,
        device: DeviceType,
    ) -> Result<Session, AuthError> {
        // 1. The lookup must exist and be in good standing.
        let lookup = lookup.ok_or(AuthError::PrincipalNotFound)?;
        if lookup.status != PrincipalStatus::Normal {
            return Err(AuthError::PrincipalDisabled);
        }

        // 2. In single-device mode, evict the previous session on this
        //    device before issuing the new one.
        let device_key = self.device_key(lookup.principal_id, device);
        if self.config.single_device {
            if let Some(previous) = self.store.get(&device_key).await? {
                self.store.delete(&self.session_key(&previous)).await?;
                tracing::info!(
                    namespace = %self.namespace,
                    principal_id = lookup.principal_id,
                    %device,
                    "single-device mode: previous session evicted"
                );
            }
        }

        // 3. Issue the token and write the session.
        let now = Utc::now();
        let session = Session {
            token: generate_token(),
            principal_id: lookup.principal_id,
            device,
            issued_at: now,
            expires_at: self
                .config
                .token_ttl
                .map(|ttl| now + chrono::Duration::from_std(ttl).unwrap_or_default()),
            last_activity_at: now,
        };
        self.write_session(&session).await?;
        self.store
            .put(&device_key, &session.token, self.store_ttl())
            .await?;

        tracing::info!(
            namespace = %self.namespace,
            principal_id = session.principal_id,
            %device,
            "session opened"
        );
        Ok(session)
    }

    /// Look up the session for a bearer token and refresh its activity.
    ///
    /// A token from another namespace misses this namespace's key space and
    /// is reported as [`AuthError::TokenInvalid`], exactly like a token that
    /// never existed.
    pub async fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let raw = self
            .store
            .get(&self.session_key(token))
            .await?
            .ok_or(AuthError::TokenInvalid)?;
        let mut session: Session = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Payload(format!("session record: {e}")))?;

        let now = Utc::now();
        if session.is_expired(now) {
            return Err(AuthError::TokenExpired);
        }

        // Sliding renewal: push both the logical expiry and the store TTL.
        session.last_activity_at = now;
        if let Some(ttl) = self.config.token_ttl {
            session.expires_at = Some(now + chrono::Duration::from_std(ttl).unwrap_or_default());
        }
        self.write_session(&session).await?;
        if let Some(ttl) = self.store_ttl() {
            // Keep the device index alive as long as the session it points at.
            self.store
                .expire(
                    &self.device_key(session.principal_id, session.device),
                    ttl,
                )
                .await?;
        }

        Ok(session)
    }

    /// Close the session for `token`. Idempotent: an unknown or already
    /// logged-out token is not an error.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let session_key = self.session_key(token);
        let Some(raw) = self.store.get(&session_key).await? else {
            tracing::debug!(namespace = %self.namespace, "logout for unknown token ignored");
            return Ok(());
        };

        self.store.delete(&session_key).await?;

        // Best-effort cleanup of the device index and the permission cache;
        // the session itself is already gone.
        if let Ok(session) = serde_json::from_str::<Session>(&raw) {
            let device_key = self.device_key(session.principal_id, session.device);
            if self.store.get(&device_key).await?.as_deref() == Some(token) {
                self.store.delete(&device_key).await?;
            }
            self.invalidate_permissions(session.principal_id).await?;
            tracing::info!(
                namespace = %self.namespace,
                principal_id = session.principal_id,
                "session closed"
            );
        }
        Ok(())
    }

    /// Forcibly revoke a principal's session on one device (admin action).
    pub async fn force_logout(
        &self,
        principal_id: PrincipalId,
        device: DeviceType,
    ) -> Result<(), AuthError> {
        let device_key = self.device_key(principal_id, device);
        if let Some(token) = self.store.get(&device_key).await? {
            self.store.delete(&self.session_key(&token)).await?;
            self.store.delete(&device_key).await?;
            self.invalidate_permissions(principal_id).await?;
            tracing::info!(namespace = %self.namespace, principal_id, %device, "session revoked");
        }
        Ok(())
    }

    async fn write_session(&self, session: &Session) -> Result<(), AuthError> {
        let raw = serde_json::to_string(session)
            .map_err(|e| StoreError::Payload(format!("session record: {e}")))?;
        self.store
            .put(&self.session_key(&session.token), &raw, self.store_ttl())
            .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Permission resolution
    // -----------------------------------------------------------------------

    /// The principal's role keys and the union of permission strings
    /// reachable through them, cached in the store for the configured
    /// lifetime.
    pub async fn resolve_permissions(
        &self,
        principal_id: PrincipalId,
    ) -> Result<PermissionSet, AuthError> {
        let cache_key = self.permission_key(principal_id);
        if let Some(raw) = self.store.get(&cache_key).await? {
            if let Ok(cached) = serde_json::from_str::<PermissionSet>(&raw) {
                return Ok(cached);
            }
            // An unreadable cache entry is dropped and recomputed.
            self.store.delete(&cache_key).await?;
        }

        let roles = self.directory.roles_of(principal_id).await?;
        let permissions = self.directory.permissions_of(principal_id).await?;
        let resolved = PermissionSet::new(roles, permissions);

        let raw = serde_json::to_string(&resolved)
            .map_err(|e| StoreError::Payload(format!("permission cache: {e}")))?;
        self.store
            .put(&cache_key, &raw, Some(self.config.permission_cache_ttl))
            .await?;
        Ok(resolved)
    }

    /// Drop the cached closure; the next resolution recomputes it. Called on
    /// logout and by role-change notifications.
    pub async fn invalidate_permissions(&self, principal_id: PrincipalId) -> Result<(), AuthError> {
        self.store.delete(&self.permission_key(principal_id)).await?;
        Ok(())
    }

    pub async fn has_permission(
        &self,
        principal_id: PrincipalId,
        required: &str,
    ) -> Result<bool, AuthError> {
        Ok(self.resolve_permissions(principal_id).await?.has_permission(required))
    }

    pub async fn has_any_permission(
        &self,
        principal_id: PrincipalId,
        required: &[&str],
    ) -> Result<bool, AuthError> {
        Ok(self
            .resolve_permissions(principal_id)
            .await?
            .has_any_permission(required))
    }

    pub async fn has_all_permissions(
        &self,
        principal_id: PrincipalId,
        required: &[&str],
    ) -> Result<bool, AuthError> {
        Ok(self
            .resolve_permissions(principal_id)
            .await?
            .has_all_permissions(required))
    }

    pub async fn has_role(&self, principal_id: PrincipalId, role: &str) -> Result<bool, AuthError> {
        Ok(self.resolve_permissions(principal_id).await?.has_role(role))
    }

    pub async fn has_any_role(
        &self,
        principal_id: PrincipalId,
        roles: &[&str],
    ) -> Result<bool, AuthError> {
        Ok(self.resolve_permissions(principal_id).await?.has_any_role(roles))
    }

    pub async fn has_all_roles(
        &self,
        principal_id: PrincipalId,
        roles: &[&str],
    ) -> Result<bool, AuthError> {
        Ok(self.resolve_permissions(principal_id).await?.has_all_roles(roles))
    }
}

/// Generate a cryptographically random session token.
fn generate_token() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}
