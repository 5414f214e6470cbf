//! In-process storage and permission backends.
//!
//! Used by tests and local tooling; production wiring supplies its own
//! [`ContentStore`](content_sdk::ContentStore) and
//! [`PermissionStore`](content_sdk::PermissionStore).

pub mod memory;
pub mod permissions;

pub use memory::{CallCounts, MemoryStore, MemoryTable};
pub use permissions::MemoryPermissionStore;
