//! HTTP server setup and pipeline assembly.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire the admission pipeline in its fixed stage order
//! - Serve plain HTTP or TLS until shutdown
//! - Observability (trace spans, request IDs, metrics)

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware as axum_middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::IdentityStrategy;
use crate::config::ServerConfig;
use crate::http::middleware::headers::{self, HeaderPolicy};
use crate::http::middleware::origin::{self, OriginPolicy};
use crate::http::middleware::{auth, session};
use crate::http::{payload, routes};
use crate::session::SessionStore;

/// Application state injected into the pipeline middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub origin_policy: Arc<OriginPolicy>,
    pub header_policy: Arc<HeaderPolicy>,
    pub store: Arc<dyn SessionStore>,
    pub identity: Arc<dyn IdentityStrategy>,
}

/// HTTP server hosting the admission pipeline.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Assemble the server from its configuration and collaborators.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn SessionStore>,
        identity: Arc<dyn IdentityStrategy>,
    ) -> Self {
        let state = AppState {
            origin_policy: Arc::new(OriginPolicy::new(config.origins.allowed.clone())),
            header_policy: Arc::new(HeaderPolicy::from_config(
                &config.security,
                config.tls_enabled(),
            )),
            config: Arc::new(config),
            store,
            identity,
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the router with the pipeline layers.
    ///
    /// Layer stacking runs outermost-last, so reading bottom-up gives
    /// the request path: request id → trace → timeout → protective
    /// headers → origin gate → compression → payload decoders → session
    /// → identity → routes. A stage that rejects writes its response
    /// right there; nothing below it sees the request.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        routes::router()
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                auth::bind_identity,
            ))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                session::materialize,
            ))
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                payload::decode,
            ))
            .layer(CompressionLayer::new())
            .layer(axum_middleware::from_fn_with_state(
                state.clone(),
                origin::enforce,
            ))
            .layer(axum_middleware::from_fn_with_state(state, headers::apply))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Serve plain HTTP on the listener until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve TLS on the listener until the shutdown signal fires.
    pub async fn run_tls(
        self,
        listener: TcpListener,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTPS server starting");

        let handle = axum_server::Handle::new();
        let graceful = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            graceful.graceful_shutdown(Some(Duration::from_secs(10)));
        });

        axum_server::from_tcp_rustls(listener.into_std()?, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
