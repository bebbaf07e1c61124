//! Bearer-token session extractors, one per namespace.
//!
//! These realize the gateway's authentication rule: `/admin/**` traffic must
//! carry a valid admin-namespace token, `/member/**` a member-namespace one.
//! A token from the wrong namespace fails exactly like an unknown token --
//! the rejection never reveals which namespace it belongs to.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use warden_core::error::AuthError;
use warden_session::Session;

use crate::error::AppError;
use crate::state::AppState;

/// Pull the bearer token out of the `Authorization` header, if present.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Authenticated admin-namespace session.
///
/// ```ignore
/// async fn handler(AdminSession(session): AdminSession) -> AppResult<Json<()>> {
///     tracing::info!(principal_id = session.principal_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct AdminSession(pub Session);

impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Auth(AuthError::TokenInvalid))?;
        let session = state.admin.validate(token).await?;
        Ok(AdminSession(session))
    }
}

/// Authenticated member-namespace session.
pub struct MemberSession(pub Session);

impl FromRequestParts<AppState> for MemberSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Auth(AuthError::TokenInvalid))?;
        let session = state.member.validate(token).await?;
        Ok(MemberSession(session))
    }
}

/// Reject with 403 unless the admin session's principal holds `required`.
pub async fn require_permission(
    state: &AppState,
    session: &Session,
    required: &str,
) -> Result<(), AppError> {
    if state.admin.has_permission(session.principal_id, required).await? {
        Ok(())
    } else {
        Err(AppError::PermissionDenied(required.to_string()))
    }
}
