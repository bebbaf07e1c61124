//! Repository for the `menus` table and its role joins.

use warden_core::types::PrincipalId;

use crate::DbPool;

/// Provides permission-string lookups for the admin namespace.
pub struct MenuRepo;

impl MenuRepo {
    /// Distinct non-empty permission strings reachable through the user's
    /// roles.
    pub async fn perms_by_user(
        pool: &DbPool,
        user_id: PrincipalId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT m.perms FROM menus m \
             JOIN role_menus rm ON rm.menu_id = m.id \
             JOIN user_roles ur ON ur.role_id = rm.role_id \
             WHERE ur.user_id = $1 AND m.perms IS NOT NULL AND m.perms <> ''",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
