//! Shared domain types, error taxonomy, and the permission algebra used by
//! the session and lock crates.
//!
//! This crate has no I/O and no internal dependencies so every other
//! workspace member can depend on it freely.

pub mod error;
pub mod permission;
pub mod types;
