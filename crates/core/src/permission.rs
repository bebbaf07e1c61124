//! Permission strings and wildcard matching.
//!
//! Permissions follow the `module:resource:action` convention, e.g.
//! `system:user:list`. A granted permission may use `*` in any segment to
//! match every value at that position, so `system:*:list` covers both
//! `system:user:list` and `system:role:list`. Role keys are plain strings
//! and are always compared exactly.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The grant that matches every permission regardless of segment count.
pub const GLOBAL_GRANT: &str = "*:*:*";

/// Segment separator in permission strings.
const SEPARATOR: char = ':';

/// Wildcard segment value.
const WILDCARD: &str = "*";

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Whether `granted` covers `required`.
///
/// Rules:
/// - The global grant `*:*:*` matches everything.
/// - Otherwise both strings must have the same number of segments.
/// - A `*` segment in `granted` matches any segment of `required` at that
///   position; every other segment must compare equal.
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == GLOBAL_GRANT {
        return true;
    }
    let granted: Vec<&str> = granted.split(SEPARATOR).collect();
    let required: Vec<&str> = required.split(SEPARATOR).collect();
    if granted.len() != required.len() {
        return false;
    }
    granted
        .iter()
        .zip(required.iter())
        .all(|(g, r)| *g == WILDCARD || g == r)
}

/// Join `module:resource:action` into a permission string.
pub fn permission_string(module: &str, resource: &str, action: &str) -> String {
    format!("{module}{SEPARATOR}{resource}{SEPARATOR}{action}")
}

// ---------------------------------------------------------------------------
// PermissionSet
// ---------------------------------------------------------------------------

/// The resolved authorization closure of one principal: its role keys and
/// the union of permission strings reachable through them.
///
/// Derived on demand from the role/menu collaborators and cached for the
/// session's lifetime; duplicates collapse by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
}

impl PermissionSet {
    pub fn new(roles: HashSet<String>, permissions: HashSet<String>) -> Self {
        Self { roles, permissions }
    }

    /// Whether any granted permission covers `required`.
    pub fn has_permission(&self, required: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, required))
    }

    /// Whether at least one of `required` is covered.
    pub fn has_any_permission<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|r| self.has_permission(r.as_ref()))
    }

    /// Whether every one of `required` is covered.
    ///
    /// An empty `required` slice is vacuously false, matching the behavior
    /// callers expect from a guard ("require nothing" is a configuration
    /// mistake, not a grant).
    pub fn has_all_permissions<S: AsRef<str>>(&self, required: &[S]) -> bool {
        !required.is_empty() && required.iter().all(|r| self.has_permission(r.as_ref()))
    }

    /// Whether the principal holds the exact role key.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn has_any_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles.iter().any(|r| self.has_role(r.as_ref()))
    }

    pub fn has_all_roles<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        !roles.is_empty() && roles.iter().all(|r| self.has_role(r.as_ref()))
    }
}
