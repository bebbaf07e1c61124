//! SQL-backed implementations of the session authority's collaborator
//! traits.

use std::collections::HashSet;

use async_trait::async_trait;
use warden_core::error::{AuthError, StoreError};
use warden_core::types::{CredentialLookup, DeviceType, PrincipalId, PrincipalStatus};
use warden_session::{CredentialVerifier, PrincipalDirectory};

use crate::models::user::principal_status;
use crate::password::verify_password;
use crate::repositories::{MemberRepo, MenuRepo, RoleRepo, UserRepo};
use crate::DbPool;

fn db_error(e: sqlx::Error) -> AuthError {
    AuthError::Store(StoreError::Backend(format!("database: {e}")))
}

fn hash_error(e: argon2::password_hash::Error) -> AuthError {
    AuthError::Store(StoreError::Backend(format!("password hash: {e}")))
}

// ---------------------------------------------------------------------------
// Admin namespace
// ---------------------------------------------------------------------------

/// Role/menu resolution for administrators.
pub struct SqlAdminDirectory {
    pool: DbPool,
}

impl SqlAdminDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrincipalDirectory for SqlAdminDirectory {
    async fn roles_of(&self, principal_id: PrincipalId) -> Result<HashSet<String>, AuthError> {
        Ok(RoleRepo::role_keys_by_user(&self.pool, principal_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect())
    }

    async fn permissions_of(
        &self,
        principal_id: PrincipalId,
    ) -> Result<HashSet<String>, AuthError> {
        Ok(MenuRepo::perms_by_user(&self.pool, principal_id)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect())
    }
}

/// Credential verification against the `users` table.
pub struct SqlAdminVerifier {
    pool: DbPool,
}

impl SqlAdminVerifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialVerifier for SqlAdminVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<CredentialLookup, AuthError> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(db_error)?
            .ok_or(AuthError::PrincipalNotFound)?;

        let status = principal_status(user.status);
        if status != PrincipalStatus::Normal {
            return Err(AuthError::PrincipalDisabled);
        }
        if !verify_password(password, &user.password_hash).map_err(hash_error)? {
            return Err(AuthError::WrongCredentials);
        }

        Ok(CredentialLookup {
            principal_id: user.id,
            status,
        })
    }

    async fn record_login(
        &self,
        principal_id: PrincipalId,
        device: DeviceType,
    ) -> Result<(), AuthError> {
        UserRepo::record_login(&self.pool, principal_id, device.as_str())
            .await
            .map_err(db_error)
    }
}

// ---------------------------------------------------------------------------
// Member namespace
// ---------------------------------------------------------------------------

/// Member directory: members authenticate but carry no back-office grants,
/// so both lookups are empty by definition.
pub struct MemberDirectory;

#[async_trait]
impl PrincipalDirectory for MemberDirectory {
    async fn roles_of(&self, _principal_id: PrincipalId) -> Result<HashSet<String>, AuthError> {
        Ok(HashSet::new())
    }

    async fn permissions_of(
        &self,
        _principal_id: PrincipalId,
    ) -> Result<HashSet<String>, AuthError> {
        Ok(HashSet::new())
    }
}

/// Credential verification against the `members` table.
pub struct SqlMemberVerifier {
    pool: DbPool,
}

impl SqlMemberVerifier {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialVerifier for SqlMemberVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<CredentialLookup, AuthError> {
        let member = MemberRepo::find_by_username(&self.pool, username)
            .await
            .map_err(db_error)?
            .ok_or(AuthError::PrincipalNotFound)?;

        let status = principal_status(member.status);
        if status != PrincipalStatus::Normal {
            return Err(AuthError::PrincipalDisabled);
        }
        if !verify_password(password, &member.password_hash).map_err(hash_error)? {
            return Err(AuthError::WrongCredentials);
        }

        Ok(CredentialLookup {
            principal_id: member.id,
            status,
        })
    }

    async fn record_login(
        &self,
        principal_id: PrincipalId,
        device: DeviceType,
    ) -> Result<(), AuthError> {
        MemberRepo::record_login(&self.pool, principal_id, device.as_str())
            .await
            .map_err(db_error)
    }
}
