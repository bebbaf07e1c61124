//! Route definitions for member-namespace authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/member/auth`.
///
/// ```text
/// POST /login       -> member_login
/// POST /logout      -> member_logout
/// GET  /me          -> member_me
/// GET  /permissions -> member_permissions
/// GET  /roles       -> member_roles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::member_login))
        .route("/logout", post(auth::member_logout))
        .route("/me", get(auth::member_me))
        .route("/permissions", get(auth::member_permissions))
        .route("/roles", get(auth::member_roles))
}
