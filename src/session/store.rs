//! Session store contract.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::session::{SessionId, SessionRecord};

/// Error type for store operations.
///
/// Backends collapse their driver-specific failures into these variants;
/// the pipeline maps any of them to a 503 for the client, since every
/// downstream stage depends on session state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached at all.
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// The backend was reached but the operation failed.
    #[error("store operation failed: {0}")]
    Backend(String),
}

/// Capability contract every session store backend satisfies.
///
/// Document stores, key-value caches, and relational backends all plug in
/// behind this same interface. Implementations serialize concurrent
/// access to the same identifier; callers treat get/create as atomic per
/// key.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Establish connectivity. Startup awaits this and refuses to open
    /// the listener until it returns `Ok` — the result must reflect
    /// confirmed readiness, not a connection merely being requested.
    async fn connect(&self) -> Result<(), StoreError>;

    /// Look up a live session. Expired or unknown identifiers resolve to
    /// `None`, not an error.
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Create a fresh session with a new unguessable identifier.
    async fn create(&self) -> Result<SessionRecord, StoreError>;

    /// Persist a record's data. Route handlers mutate session state and
    /// hand it back through here; the lifetime is untouched.
    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Remove a session outright.
    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError>;

    /// Extend a live session's lifetime. Returns whether the session
    /// still existed.
    async fn touch(&self, id: &SessionId, ttl: Duration) -> Result<bool, StoreError>;
}
