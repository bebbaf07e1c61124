//! Server configuration loaded from environment variables.

use std::time::Duration;

use warden_session::SessionConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session rules for the admin namespace.
    pub admin_sessions: SessionConfig,
    /// Session rules for the member namespace.
    pub member_sessions: SessionConfig,
    /// Rolling lease for watchdog-renewed locks, in seconds (default: `30`).
    pub lock_watchdog_lease_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `HOST`                           | `0.0.0.0`               |
    /// | `PORT`                           | `3000`                  |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`           | `30`                    |
    /// | `ADMIN_SESSION_TTL_SECS`         | `2592000` (30 days; `0` = no expiry) |
    /// | `ADMIN_SINGLE_DEVICE`            | `false`                 |
    /// | `MEMBER_SESSION_TTL_SECS`        | `2592000` (30 days; `0` = no expiry) |
    /// | `MEMBER_SINGLE_DEVICE`           | `false`                 |
    /// | `PERMISSION_CACHE_TTL_SECS`      | session TTL             |
    /// | `LOCK_WATCHDOG_LEASE_SECS`       | `30`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let lock_watchdog_lease_secs: u64 = std::env::var("LOCK_WATCHDOG_LEASE_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("LOCK_WATCHDOG_LEASE_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            admin_sessions: session_config_from_env("ADMIN"),
            member_sessions: session_config_from_env("MEMBER"),
            lock_watchdog_lease_secs,
        }
    }
}

/// Build one namespace's [`SessionConfig`] from `{prefix}_`-scoped env vars.
fn session_config_from_env(prefix: &str) -> SessionConfig {
    let defaults = SessionConfig::default();

    let token_ttl = match std::env::var(format!("{prefix}_SESSION_TTL_SECS")) {
        Ok(raw) => {
            let secs: u64 = raw
                .parse()
                .unwrap_or_else(|_| panic!("{prefix}_SESSION_TTL_SECS must be a valid u64"));
            // 0 disables expiry entirely.
            (secs > 0).then(|| Duration::from_secs(secs))
        }
        Err(_) => defaults.token_ttl,
    };

    let single_device = std::env::var(format!("{prefix}_SINGLE_DEVICE"))
        .map(|v| v == "true" || v == "1")
        .unwrap_or(defaults.single_device);

    let permission_cache_ttl = std::env::var("PERMISSION_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .or(token_ttl)
        .unwrap_or(defaults.permission_cache_ttl);

    SessionConfig {
        token_ttl,
        single_device,
        permission_cache_ttl,
    }
}
