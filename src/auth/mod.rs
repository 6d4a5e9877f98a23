//! Identity resolution.
//!
//! The pipeline never verifies credentials itself; it asks an
//! [`IdentityStrategy`] to resolve a principal out of bound session
//! state. Strategies are pluggable — the shipped one reads a serialized
//! principal from a well-known session key, which is where the login
//! flow deposits it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

/// Session key under which the login flow stores the serialized
/// principal.
pub const PRINCIPAL_SESSION_KEY: &str = "auth.principal";

/// Resolved authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Pluggable identity resolution over session state.
///
/// Resolution is idempotent: the same session yields the same principal
/// absent external mutation.
#[async_trait]
pub trait IdentityStrategy: Send + Sync {
    async fn resolve(&self, session: &SessionRecord) -> Option<Principal>;
}

/// Strategy resolving the principal serialized under a session key.
pub struct SessionPrincipal {
    key: String,
}

impl SessionPrincipal {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for SessionPrincipal {
    fn default() -> Self {
        Self::new(PRINCIPAL_SESSION_KEY)
    }
}

#[async_trait]
impl IdentityStrategy for SessionPrincipal {
    async fn resolve(&self, session: &SessionRecord) -> Option<Principal> {
        let value = session.data.get(&self.key)?;
        match serde_json::from_value(value.clone()) {
            Ok(principal) => Some(principal),
            Err(e) => {
                tracing::warn!(
                    session_id = %session.id,
                    error = %e,
                    "session carries an undecodable principal, treating as anonymous"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use serde_json::json;

    fn session_with(key: &str, value: serde_json::Value) -> SessionRecord {
        let mut record = SessionRecord::new(SessionId::from("s1"));
        record.data.insert(key.to_string(), value);
        record
    }

    #[tokio::test]
    async fn test_resolves_stored_principal() {
        let strategy = SessionPrincipal::default();
        let session = session_with(
            PRINCIPAL_SESSION_KEY,
            json!({"id": "u42", "name": "Ada"}),
        );

        let principal = strategy.resolve(&session).await.unwrap();
        assert_eq!(principal.id, "u42");
        assert_eq!(principal.name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn test_anonymous_session_resolves_none() {
        let strategy = SessionPrincipal::default();
        let session = SessionRecord::new(SessionId::from("s1"));
        assert!(strategy.resolve(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_principal_is_anonymous() {
        let strategy = SessionPrincipal::default();
        let session = session_with(PRINCIPAL_SESSION_KEY, json!(["not", "a", "principal"]));
        assert!(strategy.resolve(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let strategy = SessionPrincipal::default();
        let session = session_with(PRINCIPAL_SESSION_KEY, json!({"id": "u42"}));

        let first = strategy.resolve(&session).await;
        let second = strategy.resolve(&session).await;
        assert_eq!(first, second);
    }
}
