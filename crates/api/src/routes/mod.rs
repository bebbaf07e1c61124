//! Route tree assembly.

use axum::Router;

use crate::state::AppState;

pub mod admin_auth;
pub mod health;
pub mod member_auth;

/// All application routes (health plus both namespace trees).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/admin/auth", admin_auth::router())
        .nest("/member/auth", member_auth::router())
}
