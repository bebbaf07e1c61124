//! Application-level error type and its HTTP mapping.
//!
//! Every core-origin failure crossing the HTTP boundary becomes a stable
//! numeric code plus a human-readable message, decoupled from the internal
//! error enums: clients key on the code, the enums stay free to evolve.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use warden_core::error::{AuthError, LockError};

// Stable error codes. Never renumber; add new codes at the end of a block.
const CODE_PRINCIPAL_NOT_FOUND: u32 = 10001;
const CODE_WRONG_CREDENTIALS: u32 = 10002;
const CODE_PRINCIPAL_DISABLED: u32 = 10003;
const CODE_TOKEN_INVALID: u32 = 10004;
const CODE_TOKEN_EXPIRED: u32 = 10005;
const CODE_PERMISSION_DENIED: u32 = 10006;
const CODE_LOCK_UNAVAILABLE: u32 = 20001;
const CODE_LOCK_TIMED_OUT: u32 = 20002;
const CODE_LOCK_INTERRUPTED: u32 = 20003;
const CODE_VALIDATION: u32 = 40000;
const CODE_INTERNAL: u32 = 50000;

/// Application-level error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An authentication/session failure from the session authority.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A distributed-lock failure from the lock coordinator.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// The authenticated principal lacks a required permission or role.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A malformed request body or parameter.
    #[error("validation error: {0}")]
    Validation(String),

    /// An internal error with a human-readable message.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Auth(auth) => match auth {
                AuthError::PrincipalNotFound => (
                    StatusCode::UNAUTHORIZED,
                    CODE_PRINCIPAL_NOT_FOUND,
                    "Account does not exist".to_string(),
                ),
                AuthError::WrongCredentials => (
                    StatusCode::UNAUTHORIZED,
                    CODE_WRONG_CREDENTIALS,
                    "Incorrect username or password".to_string(),
                ),
                AuthError::PrincipalDisabled => (
                    StatusCode::FORBIDDEN,
                    CODE_PRINCIPAL_DISABLED,
                    "Account is disabled".to_string(),
                ),
                AuthError::TokenInvalid => (
                    StatusCode::UNAUTHORIZED,
                    CODE_TOKEN_INVALID,
                    "Not logged in or token is invalid".to_string(),
                ),
                AuthError::TokenExpired => (
                    StatusCode::UNAUTHORIZED,
                    CODE_TOKEN_EXPIRED,
                    "Login has expired, please log in again".to_string(),
                ),
                AuthError::Store(e) => {
                    tracing::error!(error = %e, "session store failure");
                    internal()
                }
            },

            AppError::Lock(lock) => match lock {
                LockError::LockUnavailable { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    CODE_LOCK_UNAVAILABLE,
                    "The system is busy, please try again later".to_string(),
                ),
                LockError::AcquireTimedOut { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    CODE_LOCK_TIMED_OUT,
                    "The system is busy, please try again later".to_string(),
                ),
                LockError::AcquireInterrupted { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    CODE_LOCK_INTERRUPTED,
                    "The operation was interrupted, please try again".to_string(),
                ),
                LockError::KeyExpression(e) => {
                    tracing::error!(error = %e, "lock key expression failure");
                    internal()
                }
                LockError::Store(e) => {
                    tracing::error!(error = %e, "lock store failure");
                    internal()
                }
            },

            AppError::PermissionDenied(required) => (
                StatusCode::FORBIDDEN,
                CODE_PERMISSION_DENIED,
                format!("Insufficient permissions: {required}"),
            ),

            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, CODE_VALIDATION, msg.clone())
            }

            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                internal()
            }
        };

        let body = json!({
            "code": code,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, u32, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        CODE_INTERNAL,
        "An internal error occurred".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_map_to_stable_codes() {
        let response = AppError::Auth(AuthError::TokenInvalid).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AppError::Auth(AuthError::PrincipalDisabled).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_lock_errors_map_to_service_unavailable() {
        let response = AppError::Lock(LockError::LockUnavailable {
            key: "k".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
