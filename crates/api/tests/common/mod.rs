//! Shared helpers for HTTP-level integration tests.
//!
//! The app is built over [`MemoryStore`] with stub credential/directory
//! collaborators, so the tests exercise the full middleware and handler
//! stack without a database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use tower::ServiceExt;
use warden_api::config::ServerConfig;
use warden_api::routes;
use warden_api::state::AppState;
use warden_core::error::AuthError;
use warden_core::types::{CredentialLookup, Namespace, PrincipalId, PrincipalStatus};
use warden_lock::LockCoordinator;
use warden_session::{CredentialVerifier, PrincipalDirectory, SessionAuthority, SessionConfig};
use warden_store::MemoryStore;

// ---------------------------------------------------------------------------
// Stub collaborators
// ---------------------------------------------------------------------------

/// Credential verifier backed by an in-memory user table.
#[derive(Default)]
pub struct StubVerifier {
    users: HashMap<String, (String, CredentialLookup)>,
}

impl StubVerifier {
    pub fn with_user(
        mut self,
        username: &str,
        password: &str,
        principal_id: PrincipalId,
        status: PrincipalStatus,
    ) -> Self {
        self.users.insert(
            username.to_string(),
            (
                password.to_string(),
                CredentialLookup {
                    principal_id,
                    status,
                },
            ),
        );
        self
    }
}

#[async_trait]
impl CredentialVerifier for StubVerifier {
    async fn verify(&self, username: &str, password: &str) -> Result<CredentialLookup, AuthError> {
        let (expected, lookup) = self
            .users
            .get(username)
            .ok_or(AuthError::PrincipalNotFound)?;
        if lookup.status != PrincipalStatus::Normal {
            return Err(AuthError::PrincipalDisabled);
        }
        if expected != password {
            return Err(AuthError::WrongCredentials);
        }
        Ok(*lookup)
    }
}

/// Role/permission directory whose grants can be changed mid-test.
#[derive(Default)]
pub struct StubDirectory {
    grants: Mutex<HashMap<PrincipalId, (HashSet<String>, HashSet<String>)>>,
}

impl StubDirectory {
    pub fn grant(&self, principal_id: PrincipalId, roles: &[&str], permissions: &[&str]) {
        self.grants.lock().unwrap().insert(
            principal_id,
            (
                roles.iter().map(|s| s.to_string()).collect(),
                permissions.iter().map(|s| s.to_string()).collect(),
            ),
        );
    }
}

#[async_trait]
impl PrincipalDirectory for StubDirectory {
    async fn roles_of(&self, principal_id: PrincipalId) -> Result<HashSet<String>, AuthError> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(&principal_id)
            .map(|(roles, _)| roles.clone())
            .unwrap_or_default())
    }

    async fn permissions_of(
        &self,
        principal_id: PrincipalId,
    ) -> Result<HashSet<String>, AuthError> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .get(&principal_id)
            .map(|(_, permissions)| permissions.clone())
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Test fixture: the router plus handles for mutating collaborator state.
pub struct TestApp {
    pub router: Router,
    pub admin_directory: Arc<StubDirectory>,
}

/// Seeded users:
/// - admin `alice` / `correct` (principal 1, normal)
/// - admin `carol` / `secret` (principal 3, normal)
/// - admin `dave`  / `whatever` (principal 2, disabled)
/// - member `bob`  / `hunter2` (principal 10, normal)
pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let admin_directory = Arc::new(StubDirectory::default());
    let member_directory = Arc::new(StubDirectory::default());

    let session_config = SessionConfig {
        token_ttl: Some(Duration::from_secs(3600)),
        ..SessionConfig::default()
    };

    let admin = Arc::new(SessionAuthority::new(
        Namespace::Admin,
        store.clone(),
        admin_directory.clone(),
        session_config.clone(),
    ));
    let member = Arc::new(SessionAuthority::new(
        Namespace::Member,
        store.clone(),
        member_directory,
        session_config,
    ));

    let admin_verifier = Arc::new(
        StubVerifier::default()
            .with_user("alice", "correct", 1, PrincipalStatus::Normal)
            .with_user("carol", "secret", 3, PrincipalStatus::Normal)
            .with_user("dave", "whatever", 2, PrincipalStatus::Disabled),
    );
    let member_verifier = Arc::new(
        StubVerifier::default().with_user("bob", "hunter2", 10, PrincipalStatus::Normal),
    );

    let state = AppState {
        store: store.clone(),
        config: Arc::new(test_config()),
        admin,
        member,
        admin_verifier,
        member_verifier,
        locks: Arc::new(LockCoordinator::new(store)),
    };

    let router = Router::new().merge(routes::api_routes()).with_state(state);

    TestApp {
        router,
        admin_directory,
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        admin_sessions: SessionConfig::default(),
        member_sessions: SessionConfig::default(),
        lock_watchdog_lease_secs: 30,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn post_json(app: &Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request construction");
    app.clone().oneshot(request).await.expect("request dispatch")
}

pub async fn post_json_auth(
    app: &Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request construction");
    app.clone().oneshot(request).await.expect("request dispatch")
}

pub async fn post_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request construction");
    app.clone().oneshot(request).await.expect("request dispatch")
}

pub async fn get_auth(app: &Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request construction");
    app.clone().oneshot(request).await.expect("request dispatch")
}

pub async fn get(app: &Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("request construction");
    app.clone().oneshot(request).await.expect("request dispatch")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    use http_body_util::BodyExt;
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collection")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body must be JSON")
}

/// Log a user in and return the token from the response.
pub async fn login(app: &Router, path: &str, username: &str, password: &str) -> String {
    let response = post_json(
        app,
        path,
        serde_json::json!({ "username": username, "password": password, "device": "PC" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login must succeed");
    let json = body_json(response).await;
    json["token"].as_str().expect("token in response").to_string()
}
