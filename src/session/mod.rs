//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Cookie header
//!     → session id (opaque token)
//!     → store.rs (get / create / touch against the backend)
//!     → SessionRecord bound to the request
//!     → cookie.rs (Set-Cookie for fresh sessions)
//! ```
//!
//! # Design Decisions
//! - Identifier entropy belongs to the store backend; nothing above the
//!   store trait ever invents tokens
//! - A cookie naming a dead session gets a brand-new identifier, never a
//!   resurrected one
//! - Backends are interchangeable behind [`store::SessionStore`]; the
//!   in-memory backend ships for development and tests

pub mod cookie;
pub mod memory;
pub mod store;

use serde_json::{Map, Value};

pub use memory::MemoryStore;
pub use store::{SessionStore, StoreError};

/// Opaque session identifier, delivered to clients in a cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Server-held state correlated to a client by its session identifier.
///
/// `data` is a free-form JSON map; route handlers own its schema. The
/// identity layer reads its principal out of a well-known key.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub data: Map<String, Value>,
}

impl SessionRecord {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            data: Map::new(),
        }
    }
}
