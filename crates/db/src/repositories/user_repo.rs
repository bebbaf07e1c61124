//! Repository for the `users` table (back-office administrators).

use warden_core::types::PrincipalId;

use crate::models::user::User;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, nickname, password_hash, status, last_login_at, \
                       last_login_device, created_at, updated_at";

/// Provides account lookups for the admin namespace.
pub struct UserRepo;

impl UserRepo {
    /// Find an administrator by username (case-sensitive).
    pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1 LIMIT 1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find an administrator by id.
    pub async fn find_by_id(pool: &DbPool, id: PrincipalId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful login (timestamp + device bookkeeping).
    pub async fn record_login(
        pool: &DbPool,
        id: PrincipalId,
        device: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET last_login_at = now(), last_login_device = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(device)
        .execute(pool)
        .await?;
        Ok(())
    }
}
