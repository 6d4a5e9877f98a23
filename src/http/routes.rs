//! Application route handlers.
//!
//! The business route table lives outside the admission layer; these
//! handlers are the dispatch seam — a liveness probe plus diagnostic
//! endpoints that read back what the pipeline attached to the request.

use axum::{
    extract::Request,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::http::middleware::auth::AuthContext;
use crate::http::middleware::session::SessionHandle;
use crate::http::payload::DecodedBody;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/session", get(session_info))
        .route("/api/v1/echo", post(echo))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Report the session and identity context the pipeline bound to this
/// request.
async fn session_info(req: Request) -> Json<Value> {
    let session = req.extensions().get::<SessionHandle>();
    let auth = req.extensions().get::<AuthContext>();
    Json(json!({
        "session_id": session.map(|s| s.record.id.as_str().to_owned()),
        "fresh": session.map(|s| s.fresh),
        "principal": auth.and_then(|a| a.principal.clone()),
    }))
}

/// Reflect the decoded request body, exercising the payload decoders.
async fn echo(req: Request) -> Json<Value> {
    let received = req
        .extensions()
        .get::<DecodedBody>()
        .map(|body| body.value().clone())
        .unwrap_or(Value::Null);
    Json(json!({ "received": received }))
}
