//! Shared utilities for integration testing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use pev_backend::auth::{IdentityStrategy, SessionPrincipal};
use pev_backend::config::ServerConfig;
use pev_backend::http::HttpServer;
use pev_backend::lifecycle::Shutdown;
use pev_backend::session::store::{SessionStore, StoreError};
use pev_backend::session::{MemoryStore, SessionId, SessionRecord};

/// Memory store wrapper that counts calls and can be switched into a
/// failing mode, so tests can observe whether the pipeline touched the
/// store at all.
pub struct InstrumentedStore {
    inner: MemoryStore,
    gets: AtomicU32,
    creates: AtomicU32,
    fail_ops: AtomicBool,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(Duration::from_secs(60)),
            gets: AtomicU32::new(0),
            creates: AtomicU32::new(0),
            fail_ops: AtomicBool::new(false),
        }
    }

    /// Make every get/create fail as if the backend dropped away.
    #[allow(dead_code)]
    pub fn break_operations(&self) {
        self.fail_ops.store(true, Ordering::SeqCst);
    }

    #[allow(dead_code)]
    pub fn get_count(&self) -> u32 {
        self.gets.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn create_count(&self) -> u32 {
        self.creates.load(Ordering::SeqCst)
    }

    fn outage(&self) -> Result<(), StoreError> {
        if self.fail_ops.load(Ordering::SeqCst) {
            Err(StoreError::Unreachable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SessionStore for InstrumentedStore {
    async fn connect(&self) -> Result<(), StoreError> {
        self.inner.connect().await
    }

    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.outage()?;
        self.inner.get(id).await
    }

    async fn create(&self) -> Result<SessionRecord, StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.outage()?;
        self.inner.create().await
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.outage()?;
        self.inner.save(record).await
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), StoreError> {
        self.outage()?;
        self.inner.destroy(id).await
    }

    async fn touch(&self, id: &SessionId, ttl: Duration) -> Result<bool, StoreError> {
        self.outage()?;
        self.inner.touch(id, ttl).await
    }
}

/// Store whose connectivity check always fails; startup tests use it to
/// prove the listener never opens.
#[allow(dead_code)]
pub struct UnreachableStore;

#[async_trait]
impl SessionStore for UnreachableStore {
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

/// Config for a loopback test server.
pub fn test_config(bind_address: &str) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_address = bind_address.to_string();
    config.observability.metrics_enabled = false;
    config
}

/// Boot the full pipeline on the given address and return the shutdown
/// handle. The returned future resolves once the listener accepts.
#[allow(dead_code)]
pub async fn spawn_server(config: ServerConfig, store: Arc<dyn SessionStore>) -> Shutdown {
    let identity: Arc<dyn IdentityStrategy> = Arc::new(SessionPrincipal::default());
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, store, identity);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .expect("test listener should bind");

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    // Wait until the socket answers before handing control to the test.
    for _ in 0..50 {
        if tokio::net::TcpStream::connect(&bind_address).await.is_ok() {
            return shutdown;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {bind_address} never became reachable");
}

/// Non-pooled client so each test request opens a fresh connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .expect("client should build")
}
