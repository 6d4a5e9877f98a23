//! Startup orchestration.
//!
//! The sequencer owns the process lifecycle state machine:
//!
//! ```text
//! Initializing → StoreConnected → Listening
//!      └────────────→ Failed (fatal, process exits non-zero)
//! ```
//!
//! The listener never opens before the session store confirms
//! connectivity: every request path downstream depends on the store, so
//! a listening socket with an unconfirmed store would accept traffic it
//! cannot serve. Confirmation is an awaited call whose result drives the
//! transition — never a fire-and-forget event subscription that can race
//! the connection actually opening.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::auth::IdentityStrategy;
use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::tls;
use crate::session::store::{SessionStore, StoreError};

/// Process-wide lifecycle state. `Listening` is the steady state;
/// `Failed` is terminal and the process exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Initializing,
    StoreConnected,
    Listening,
    Failed,
}

/// Fatal startup failures. None of these are recoverable in-process;
/// the operator fixes the cause and restarts.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("data store connectivity failed: {0}")]
    StoreConnect(#[source] StoreError),

    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error("startup already ran")]
    AlreadyStarted,

    #[error("listener cannot open before store connectivity is confirmed")]
    StoreUnconfirmed,

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Single-shot startup state machine. Not re-entrant: once a transition
/// has been taken, replaying an earlier step is an error.
pub struct StartupSequencer {
    state: LifecycleState,
}

impl StartupSequencer {
    pub fn new() -> Self {
        Self {
            state: LifecycleState::Initializing,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Await confirmed store connectivity: `Initializing → StoreConnected`.
    pub async fn confirm_store(&mut self, store: &dyn SessionStore) -> Result<(), StartupError> {
        if self.state != LifecycleState::Initializing {
            return Err(StartupError::AlreadyStarted);
        }
        match store.connect().await {
            Ok(()) => {
                self.state = LifecycleState::StoreConnected;
                tracing::info!("session store connectivity confirmed");
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Failed;
                Err(StartupError::StoreConnect(e))
            }
        }
    }

    /// Bind the listening socket: `StoreConnected → Listening`.
    pub async fn open_listener(&mut self, bind_address: &str) -> Result<TcpListener, StartupError> {
        match self.state {
            LifecycleState::StoreConnected => {}
            LifecycleState::Initializing => return Err(StartupError::StoreUnconfirmed),
            LifecycleState::Listening | LifecycleState::Failed => {
                return Err(StartupError::AlreadyStarted)
            }
        }
        match TcpListener::bind(bind_address).await {
            Ok(listener) => {
                self.state = LifecycleState::Listening;
                tracing::info!(address = bind_address, "listener open");
                Ok(listener)
            }
            Err(source) => {
                self.state = LifecycleState::Failed;
                Err(StartupError::Bind {
                    addr: bind_address.to_string(),
                    source,
                })
            }
        }
    }
}

impl Default for StartupSequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the full startup sequence, then serve until shutdown.
pub async fn run(
    config: ServerConfig,
    store: Arc<dyn SessionStore>,
    identity: Arc<dyn IdentityStrategy>,
    shutdown: Shutdown,
) -> Result<(), StartupError> {
    let mut sequencer = StartupSequencer::new();
    sequencer.confirm_store(store.as_ref()).await?;

    let tls = match &config.listener.tls {
        Some(tls_config) => Some(
            tls::load_rustls_config(tls_config)
                .await
                .map_err(StartupError::Tls)?,
        ),
        None => None,
    };

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store, identity);
    let listener = sequencer.open_listener(&bind_address).await?;

    let receiver = shutdown.subscribe();
    let result = match tls {
        Some(tls) => server.run_tls(listener, tls, receiver).await,
        None => server.run(listener, receiver).await,
    };
    result.map_err(StartupError::Serve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStore, SessionId, SessionRecord};
    use std::time::Duration;

    struct DeadStore;

    #[async_trait::async_trait]
    impl SessionStore for DeadStore {
        async fn connect(&self) -> Result<(), StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
        async fn get(&self, _: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
        async fn create(&self) -> Result<SessionRecord, StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
        async fn save(&self, _: &SessionRecord) -> Result<(), StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
        async fn destroy(&self, _: &SessionId) -> Result<(), StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
        async fn touch(&self, _: &SessionId, _: Duration) -> Result<bool, StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_happy_path_transitions() {
        let store = MemoryStore::new(Duration::from_secs(60));
        let mut sequencer = StartupSequencer::new();
        assert_eq!(sequencer.state(), LifecycleState::Initializing);

        sequencer.confirm_store(&store).await.unwrap();
        assert_eq!(sequencer.state(), LifecycleState::StoreConnected);

        let listener = sequencer.open_listener("127.0.0.1:0").await.unwrap();
        assert_eq!(sequencer.state(), LifecycleState::Listening);
        assert!(listener.local_addr().unwrap().port() > 0);
    }

    #[tokio::test]
    async fn test_dead_store_marks_failed() {
        let mut sequencer = StartupSequencer::new();
        let err = sequencer.confirm_store(&DeadStore).await.unwrap_err();
        assert!(matches!(err, StartupError::StoreConnect(_)));
        assert_eq!(sequencer.state(), LifecycleState::Failed);

        // A failed sequencer refuses to open the listener.
        assert!(matches!(
            sequencer.open_listener("127.0.0.1:0").await,
            Err(StartupError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_listener_requires_confirmed_store() {
        let mut sequencer = StartupSequencer::new();
        assert!(matches!(
            sequencer.open_listener("127.0.0.1:0").await,
            Err(StartupError::StoreUnconfirmed)
        ));
        assert_eq!(sequencer.state(), LifecycleState::Initializing);
    }

    #[tokio::test]
    async fn test_sequencer_is_not_reentrant() {
        let store = MemoryStore::new(Duration::from_secs(60));
        let mut sequencer = StartupSequencer::new();
        sequencer.confirm_store(&store).await.unwrap();
        assert!(matches!(
            sequencer.confirm_store(&store).await,
            Err(StartupError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn test_bind_failure_marks_failed() {
        let occupant = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let occupied = occupant.local_addr().unwrap().to_string();

        let store = MemoryStore::new(Duration::from_secs(60));
        let mut sequencer = StartupSequencer::new();
        sequencer.confirm_store(&store).await.unwrap();

        let err = sequencer.open_listener(&occupied).await.unwrap_err();
        assert!(matches!(err, StartupError::Bind { .. }));
        assert_eq!(sequencer.state(), LifecycleState::Failed);
    }
}
