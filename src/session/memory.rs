//! In-memory session store backend.
//!
//! Process-local storage for development and tests. Entries expire
//! lazily: a lookup past the deadline removes the entry and reports a
//! miss, which is indistinguishable from the session never existing.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Map;
use uuid::Uuid;

use crate::session::store::{SessionStore, StoreError};
use crate::session::{SessionId, SessionRecord};

struct Entry {
    data: Map<String, serde_json::Value>,
    expires_at: Instant,
}

/// DashMap-backed session store.
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Number of live (possibly expired but not yet swept) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn generate_id() -> SessionId {
        SessionId::new(Uuid::new_v4().simple().to_string())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn connect(&self) -> Result<(), StoreError> {
        // Nothing to reach; process memory is always ready.
        Ok(())
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        if let Some(entry) = self.entries.get(id.as_str()) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(SessionRecord {
                    id: id.clone(),
                    data: entry.data.clone(),
                }));
            }
        } else {
            return Ok(None);
        }

        // Expired: sweep on access.
        self.entries.remove(id.as_str());
        Ok(None)
    }

    async fn create(&self) -> Result<SessionRecord, StoreError> {
        let id = Self::generate_id();
        self.entries.insert(
            id.as_str().to_string(),
            Entry {
                data: Map::new(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(SessionRecord::new(id))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        match self.entries.get_mut(record.id.as_str()) {
            Some(mut entry) => {
                entry.data = record.data.clone();
            }
            None => {
                // Saving into a swept session re-creates it under the
                // same identifier, mirroring upsert-style backends.
                self.entries.insert(
                    record.id.as_str().to_string(),
                    Entry {
                        data: record.data.clone(),
                        expires_at: Instant::now() + self.ttl,
                    },
                );
            }
        }
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError> {
        self.entries.remove(id.as_str());
        Ok(())
    }

    async fn touch(&self, id: &SessionId, ttl: Duration) -> Result<bool, StoreError> {
        match self.entries.get_mut(id.as_str()) {
            Some(mut entry) if entry.expires_at > Instant::now() => {
                entry.expires_at = Instant::now() + ttl;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
