//! Collaborator interfaces the session authority consumes.
//!
//! Both traits are implemented per namespace (the admin and member account
//! tables are different collaborators), so neither takes a namespace
//! parameter.

use std::collections::HashSet;

use async_trait::async_trait;
use warden_core::error::AuthError;
use warden_core::types::{CredentialLookup, DeviceType, PrincipalId};

/// Role/permission lookup for one namespace's principals.
///
/// Implementations translate their own failures (SQL, RPC) into
/// [`AuthError::Store`]; the authority treats them as opaque.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync + 'static {
    /// Role keys assigned to the principal.
    async fn roles_of(&self, principal_id: PrincipalId) -> Result<HashSet<String>, AuthError>;

    /// Permission strings reachable through the principal's roles.
    async fn permissions_of(&self, principal_id: PrincipalId)
        -> Result<HashSet<String>, AuthError>;
}

/// Credential verification for one namespace.
///
/// Hashing and storage live behind this trait; the authority only ever sees
/// the verified [`CredentialLookup`].
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Verify a username/password pair.
    ///
    /// Fails with [`AuthError::PrincipalNotFound`],
    /// [`AuthError::PrincipalDisabled`], or [`AuthError::WrongCredentials`].
    async fn verify(&self, username: &str, password: &str) -> Result<CredentialLookup, AuthError>;

    /// Record a successful login (last-login timestamp/device bookkeeping).
    /// No-op by default for collaborators that keep no such state.
    async fn record_login(
        &self,
        principal_id: PrincipalId,
        device: DeviceType,
    ) -> Result<(), AuthError> {
        let _ = (principal_id, device);
        Ok(())
    }
}
