use std::sync::Arc;

use warden_lock::LockCoordinator;
use warden_session::{CredentialVerifier, SessionAuthority};
use warden_store::SharedStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// The shared session/lock store.
    pub store: Arc<dyn SharedStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session authority for the admin namespace.
    pub admin: Arc<SessionAuthority>,
    /// Session authority for the member namespace.
    pub member: Arc<SessionAuthority>,
    /// Credential collaborator for the admin namespace.
    pub admin_verifier: Arc<dyn CredentialVerifier>,
    /// Credential collaborator for the member namespace.
    pub member_verifier: Arc<dyn CredentialVerifier>,
    /// Distributed lock coordinator.
    pub locks: Arc<LockCoordinator>,
}
