//! Repository for the `roles` table and the user/role join.

use warden_core::types::PrincipalId;

use crate::models::role::Role;
use crate::DbPool;

const COLUMNS: &str = "id, role_key, role_name, created_at, updated_at";

/// Provides role lookups for the admin namespace.
pub struct RoleRepo;

impl RoleRepo {
    /// List all roles ordered by id ascending.
    pub async fn list(pool: &DbPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// Role keys assigned to one administrator.
    pub async fn role_keys_by_user(
        pool: &DbPool,
        user_id: PrincipalId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT r.role_key FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
