//! Role model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use warden_core::types::PrincipalId;

/// Full row from the `roles` table.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub id: PrincipalId,
    /// Stable machine key checked by authorization (e.g. `"admin"`).
    pub role_key: String,
    /// Human-readable display name.
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
