//! Core identity types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Opaque numeric key identifying a principal (admin user or member).
pub type PrincipalId = i64;

/// An isolated principal/session space with independent tokens and
/// authorization rules.
///
/// A principal's namespace is fixed at creation and never changes; a token
/// issued under one namespace is never valid under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Back-office administrators (the `admin` account table).
    Admin,
    /// End-user members (the `member` account table).
    Member,
}

impl Namespace {
    /// Stable lowercase name used in store keys and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Admin => "admin",
            Namespace::Member => "member",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The device class a session was opened from.
///
/// Device identity is part of the session key: one principal may hold one
/// concurrent session per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Pc,
    App,
    MiniProgram,
}

impl DeviceType {
    /// Stable name used in store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Pc => "PC",
            DeviceType::App => "APP",
            DeviceType::MiniProgram => "MINI_PROGRAM",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status as reported by the credential collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrincipalStatus {
    Normal,
    Disabled,
    LoggedOut,
}

/// The verified result of an external credential lookup, consumed by
/// `login`.
///
/// Password verification is the collaborator's responsibility; this type
/// never carries raw or hashed credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialLookup {
    pub principal_id: PrincipalId,
    pub status: PrincipalStatus,
}
