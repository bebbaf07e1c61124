//! HTTP-level integration tests for the namespace auth endpoints.
//!
//! Covers login, logout idempotence, namespace isolation, the structured
//! error codes, permission/role resolution, and the lock-guarded revoke
//! flow.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_auth, login, post_auth, post_json, post_json_auth};
use serde_json::json;

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Successful login returns 200 with token, expiry, and principal id.
#[tokio::test]
async fn test_admin_login_success() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/admin/auth/login",
        json!({ "username": "alice", "password": "correct", "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].is_string(), "response must contain a token");
    assert!(body["expires_at"].is_string(), "response must contain an expiry");
    assert_eq!(body["principal_id"], 1);
}

/// A wrong password returns 401 with the stable credential error code.
#[tokio::test]
async fn test_login_wrong_password() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/admin/auth/login",
        json!({ "username": "alice", "password": "incorrect", "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 10002);
}

/// An unknown username returns 401 with the not-found code.
#[tokio::test]
async fn test_login_unknown_user() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/admin/auth/login",
        json!({ "username": "ghost", "password": "whatever", "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 10001);
}

/// A disabled account returns 403 with the disabled code.
#[tokio::test]
async fn test_login_disabled_user() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/admin/auth/login",
        json!({ "username": "dave", "password": "whatever", "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], 10003);
}

/// Malformed input is rejected before any collaborator is consulted.
#[tokio::test]
async fn test_login_validation_rejects_empty_username() {
    let app = build_test_app();

    let response = post_json(
        &app.router,
        "/admin/auth/login",
        json!({ "username": "", "password": "x", "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], 40000);
}

// ---------------------------------------------------------------------------
// Session introspection & namespace isolation
// ---------------------------------------------------------------------------

/// `/me` requires a token and reflects the session it was issued for.
#[tokio::test]
async fn test_me_requires_and_reflects_session() {
    let app = build_test_app();

    let response = get(&app.router, "/admin/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], 10004);

    let token = login(&app.router, "/admin/auth/login", "alice", "correct").await;
    let response = get_auth(&app.router, "/admin/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["principal_id"], 1);
    assert_eq!(body["device"], "PC");
}

/// An admin token presented on a member route fails exactly like an unknown
/// token.
#[tokio::test]
async fn test_cross_namespace_token_is_rejected_as_invalid() {
    let app = build_test_app();

    let admin_token = login(&app.router, "/admin/auth/login", "alice", "correct").await;
    let response = get_auth(&app.router, "/member/auth/me", &admin_token).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], 10004, "must be indistinguishable from an invalid token");
}

/// Logout always succeeds and invalidates the session.
#[tokio::test]
async fn test_logout_is_idempotent_and_invalidates() {
    let app = build_test_app();

    let token = login(&app.router, "/admin/auth/login", "alice", "correct").await;

    let response = post_auth(&app.router, "/admin/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Second logout with the now-dead token is still a success.
    let response = post_auth(&app.router, "/admin/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&app.router, "/admin/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Permissions & roles
// ---------------------------------------------------------------------------

/// The permission/role endpoints expose the resolved closure, sorted.
#[tokio::test]
async fn test_permissions_and_roles_endpoints() {
    let app = build_test_app();
    app.admin_directory.grant(
        1,
        &["admin", "auditor"],
        &["system:user:list", "system:*:export"],
    );

    let token = login(&app.router, "/admin/auth/login", "alice", "correct").await;

    let response = get_auth(&app.router, "/admin/auth/permissions", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!(["system:*:export", "system:user:list"]));

    let response = get_auth(&app.router, "/admin/auth/roles", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!(["admin", "auditor"]));
}

/// Members authenticate but carry no back-office grants.
#[tokio::test]
async fn test_member_flow_has_empty_grants() {
    let app = build_test_app();

    let token = login(&app.router, "/member/auth/login", "bob", "hunter2").await;

    let response = get_auth(&app.router, "/member/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["principal_id"], 10);

    let response = get_auth(&app.router, "/member/auth/permissions", &token).await;
    assert_eq!(body_json(response).await["data"], json!([]));

    let response = get_auth(&app.router, "/member/auth/roles", &token).await;
    assert_eq!(body_json(response).await["data"], json!([]));
}

// ---------------------------------------------------------------------------
// Lock-guarded revoke
// ---------------------------------------------------------------------------

/// Revoking a session requires the dedicated permission.
#[tokio::test]
async fn test_revoke_requires_permission() {
    let app = build_test_app();
    // Alice holds no grants at all.
    let token = login(&app.router, "/admin/auth/login", "alice", "correct").await;

    let response = post_json_auth(
        &app.router,
        "/admin/auth/revoke",
        &token,
        json!({ "principal_id": 3, "device": "PC" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], 10006);
}

/// With the grant, revoke kills the target's session on that device.
#[tokio::test]
async fn test_revoke_kills_target_session() {
    let app = build_test_app();
    app.admin_directory.grant(1, &["admin"], &["system:session:revoke"]);

    let alice = login(&app.router, "/admin/auth/login", "alice", "correct").await;
    let carol = login(&app.router, "/admin/auth/login", "carol", "secret").await;

    let response = post_json_auth(
        &app.router,
        "/admin/auth/revoke",
        &alice,
        json!({ "principal_id": 3, "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Carol's session is gone; Alice's own is untouched.
    let response = get_auth(&app.router, "/admin/auth/me", &carol).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = get_auth(&app.router, "/admin/auth/me", &alice).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// The wildcard grant covers the revoke permission too.
#[tokio::test]
async fn test_global_grant_covers_revoke() {
    let app = build_test_app();
    app.admin_directory.grant(1, &["admin"], &["*:*:*"]);

    let alice = login(&app.router, "/admin/auth/login", "alice", "correct").await;
    let carol = login(&app.router, "/admin/auth/login", "carol", "secret").await;

    let response = post_json_auth(
        &app.router,
        "/admin/auth/revoke",
        &alice,
        json!({ "principal_id": 3, "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&app.router, "/admin/auth/me", &carol).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_probe() {
    let app = build_test_app();
    let response = get(&app.router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}
