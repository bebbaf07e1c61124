//! Login, logout, and session-introspection handlers for both namespaces.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
use warden_core::types::{DeviceType, PrincipalId};
use warden_lock::{LockContext, LockSpec};
use warden_session::{CredentialVerifier, SessionAuthority};

use crate::error::{AppError, AppResult};
use crate::extract::{require_permission, AdminSession, MemberSession};
use crate::response::DataResponse;
use crate::state::AppState;

/// Permission required to forcibly revoke another principal's session.
const PERM_SESSION_REVOKE: &str = "system:session:revoke";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /{namespace}/auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    pub device: DeviceType,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// `None` = the session has no fixed expiry.
    pub expires_at: Option<DateTime<Utc>>,
    pub principal_id: PrincipalId,
}

/// Current-session info returned by `GET /{namespace}/auth/me`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub principal_id: PrincipalId,
    pub device: DeviceType,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_activity_at: DateTime<Utc>,
}

/// Request body for `POST /admin/auth/revoke`.
#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub principal_id: PrincipalId,
    pub device: DeviceType,
}

// ---------------------------------------------------------------------------
// Shared flows
// ---------------------------------------------------------------------------

/// Verify credentials, record the login, and open the session.
async fn login_flow(
    authority: &SessionAuthority,
    verifier: &Arc<dyn CredentialVerifier>,
    input: LoginRequest,
) -> AppResult<Json<LoginResponse>> {
    // 1. Reject malformed input before touching any collaborator.
    input
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    // 2. The credential collaborator does the password work; the authority
    //    only ever sees the verified result.
    let lookup = verifier.verify(&input.username, &input.password).await?;

    // 3. Last-login bookkeeping, then the session itself.
    verifier.record_login(lookup.principal_id, input.device).await?;
    let session = authority.login(Some(lookup), input.device).await?;

    Ok(Json(LoginResponse {
        token: session.token,
        expires_at: session.expires_at,
        principal_id: session.principal_id,
    }))
}

/// Close whatever session the bearer token identifies. Always succeeds,
/// even with no or an unknown token.
async fn logout_flow(authority: &SessionAuthority, headers: &HeaderMap) -> AppResult<StatusCode> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = token {
        authority.logout(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

fn session_info(session: warden_session::Session) -> Json<SessionInfo> {
    Json(SessionInfo {
        principal_id: session.principal_id,
        device: session.device,
        issued_at: session.issued_at,
        expires_at: session.expires_at,
        last_activity_at: session.last_activity_at,
    })
}

/// Sorted for stable output; the underlying sets are unordered.
fn sorted(values: std::collections::HashSet<String>) -> Vec<String> {
    let mut values: Vec<String> = values.into_iter().collect();
    values.sort();
    values
}

// ---------------------------------------------------------------------------
// Admin namespace
// ---------------------------------------------------------------------------

/// POST /admin/auth/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    login_flow(&state.admin, &state.admin_verifier, input).await
}

/// POST /admin/auth/logout
pub async fn admin_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    logout_flow(&state.admin, &headers).await
}

/// GET /admin/auth/me
pub async fn admin_me(AdminSession(session): AdminSession) -> Json<SessionInfo> {
    session_info(session)
}

/// GET /admin/auth/permissions
pub async fn admin_permissions(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let resolved = state.admin.resolve_permissions(session.principal_id).await?;
    Ok(Json(DataResponse {
        data: sorted(resolved.permissions),
    }))
}

/// GET /admin/auth/roles
pub async fn admin_roles(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let resolved = state.admin.resolve_permissions(session.principal_id).await?;
    Ok(Json(DataResponse {
        data: sorted(resolved.roles),
    }))
}

/// POST /admin/auth/revoke
///
/// Forcibly close another principal's session on one device. Guarded by the
/// `system:session:revoke` permission and serialized per target principal
/// across instances, so two administrators revoking the same account do not
/// interleave.
pub async fn admin_revoke(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Json(input): Json<RevokeRequest>,
) -> AppResult<StatusCode> {
    require_permission(&state, &session, PERM_SESSION_REVOKE).await?;

    let spec = LockSpec::with_expression("'session:revoke:' + #principalId").wait_secs(5);
    let ctx = LockContext::new().bind("principalId", input.principal_id);
    state
        .locks
        .with_lock(&spec, &ctx, || async {
            state
                .admin
                .force_logout(input.principal_id, input.device)
                .await
                .map_err(AppError::from)
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Member namespace
// ---------------------------------------------------------------------------

/// POST /member/auth/login
pub async fn member_login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    login_flow(&state.member, &state.member_verifier, input).await
}

/// POST /member/auth/logout
pub async fn member_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    logout_flow(&state.member, &headers).await
}

/// GET /member/auth/me
pub async fn member_me(MemberSession(session): MemberSession) -> Json<SessionInfo> {
    session_info(session)
}

/// GET /member/auth/permissions
pub async fn member_permissions(
    State(state): State<AppState>,
    MemberSession(session): MemberSession,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let resolved = state.member.resolve_permissions(session.principal_id).await?;
    Ok(Json(DataResponse {
        data: sorted(resolved.permissions),
    }))
}

/// GET /member/auth/roles
pub async fn member_roles(
    State(state): State<AppState>,
    MemberSession(session): MemberSession,
) -> AppResult<Json<DataResponse<Vec<String>>>> {
    let resolved = state.member.resolve_permissions(session.principal_id).await?;
    Ok(Json(DataResponse {
        data: sorted(resolved.roles),
    }))
}
