//! Back-office administrator account model.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use warden_core::types::{PrincipalId, PrincipalStatus};

/// Account status column value for a normal account.
pub const STATUS_NORMAL: i16 = 1;
/// Account status column value for a disabled account.
pub const STATUS_DISABLED: i16 = 0;

/// Map the status column to the domain status.
pub fn principal_status(status: i16) -> PrincipalStatus {
    if status == STATUS_NORMAL {
        PrincipalStatus::Normal
    } else {
        PrincipalStatus::Disabled
    }
}

/// Full row from the `users` table.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
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
