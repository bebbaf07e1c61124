//! Distributed advisory locking over the shared store.
//!
//! A lock is one JSON record per key, mutated only through the store's
//! atomic conditional primitives, so any number of service instances can
//! contend without coordination beyond the store itself. Four kinds are
//! supported: reentrant (default), fair (strict FIFO among waiters), and
//! read/write (shared readers excluding a single writer).
//!
//! The declarative layer ([`LockSpec`] + [`LockCoordinator::with_lock`])
//! mirrors the service annotations used elsewhere in the platform: a literal
//! key or a small key expression over the call's arguments, a wait budget,
//! a lease (or watchdog renewal), and a kind.

mod coordinator;
mod keyexpr;
mod record;
mod spec;

pub use coordinator::{
    LockCoordinator, LockConfig, LockGuard, LockKind, MultiLockGuard, OwnerToken, WaitPolicy,
    LeasePolicy,
};
pub use keyexpr::{KeyExpressionError, LockContext};
pub use spec::LockSpec;
