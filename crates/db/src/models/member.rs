//! End-user member account model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use warden_core::types::PrincipalId;

/// Full row from the `members` table.
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: PrincipalId,
    pub username: String,
    pub nickname: Option<String>,
    pub password_hash: String,
    pub status: i16,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_device: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
