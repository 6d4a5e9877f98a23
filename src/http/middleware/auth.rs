//! Authentication context binder.
//!
//! Last pipeline stage before dispatch: asks the identity strategy to
//! resolve a principal out of the bound session and attaches the result
//! either way. Credential verification is the strategy's business, not
//! the pipeline's.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Principal;
use crate::http::middleware::session::SessionHandle;
use crate::http::server::AppState;

/// Identity context attached to every admitted request.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub principal: Option<Principal>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Pipeline stage: resolve and attach the identity context.
pub async fn bind_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let handle = req.extensions().get::<SessionHandle>().cloned();
    let principal = match &handle {
        Some(handle) => state.identity.resolve(&handle.record).await,
        None => None,
    };

    if let Some(principal) = &principal {
        tracing::debug!(principal_id = %principal.id, "request carries an authenticated principal");
    }

    req.extensions_mut().insert(AuthContext { principal });
    next.run(req).await
}
