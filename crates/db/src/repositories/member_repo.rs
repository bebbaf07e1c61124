//! Repository for the `members` table (end users).

use warden_core::types::PrincipalId;

use crate::models::member::Member;
use crate::DbPool;

const COLUMNS: &str = "id, username, nickname, password_hash, status, last_login_at, \
                       last_login_device, created_at, updated_at";

/// Provides account lookups for the member namespace.
pub struct MemberRepo;

impl MemberRepo {
    /// Find a member by username (case-sensitive).
    pub async fn find_by_username(
        pool: &DbPool,
        username: &str,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE username = $1 LIMIT 1");
        sqlx::query_as::<_, Member>(&query)
            .bind(username)
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
            "UPDATE members SET last_login_at = now(), last_login_device = $2, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(device)
        .execute(pool)
        .await?;
        Ok(())
    }
}
