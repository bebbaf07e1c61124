//! Menu model. Only the permission column matters to the core; the tree
//! shape (parent ids, icons, ordering) is UI concern handled elsewhere.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use warden_core::types::PrincipalId;

/// Full row from the `menus` table.
#[derive(Debug, Clone, FromRow)]
pub struct Menu {
    pub id: PrincipalId,
    pub menu_name: String,
    pub parent_id: Option<PrincipalId>,
    /// Permission string guarding the menu entry, `module:resource:action`.
    pub perms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
