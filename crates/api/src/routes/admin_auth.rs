//! Route definitions for admin-namespace authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/admin/auth`.
///
/// ```text
/// POST /login       -> admin_login
/// POST /logout      -> admin_logout
/// GET  /me          -> admin_me
/// GET  /permissions -> admin_permissions
/// GET  /roles       -> admin_roles
/// POST /revoke      -> admin_revoke (requires system:session:revoke)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::admin_login))
        .route("/logout", post(auth::admin_logout))
        .route("/me", get(auth::admin_me))
        .route("/permissions", get(auth::admin_permissions))
        .route("/roles", get(auth::admin_roles))
        .route("/revoke", post(auth::admin_revoke))
}
