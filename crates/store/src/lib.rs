//! The shared key/value store both the session authority and the lock
//! coordinator keep their state in.
//!
//! The store is the single source of truth across service instances; the
//! core crates hold no durable state of their own. Correctness of everything
//! built on top rests on the atomic conditional primitives
//! ([`SharedStore::put_if_absent`], [`SharedStore::compare_and_swap`],
//! [`SharedStore::compare_and_delete`]) — a production deployment points
//! this trait at Redis or a similar service, while [`MemoryStore`] backs
//! tests and single-node setups.

mod memory;
mod store;

pub use memory::MemoryStore;
pub use store::{SharedStore, StoreEvent, StoreEventKind, StoreResult};
