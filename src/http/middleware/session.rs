//! Session materializer.
//!
//! Binds a session to every admitted request: a live session named by
//! the cookie is resumed (and its TTL refreshed), anything else gets a
//! freshly created one. Exactly one Set-Cookie is written, and only for
//! fresh sessions. The store owns identifier entropy; a cookie naming a
//! dead session never gets its identifier resurrected.
//!
//! Store failures fail the request with a 503 — identity resolution and
//! everything behind it depend on session state, so proceeding without
//! it would only defer the error somewhere less explainable.

use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AdmissionError;
use crate::http::payload::CookieJar;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::cookie::SessionCookie;
use crate::session::store::StoreError;
use crate::session::{SessionId, SessionRecord};

/// Session state bound to the request for the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub record: SessionRecord,
    /// True when the session was created for this request (a Set-Cookie
    /// is on its way to the client).
    pub fresh: bool,
}

/// Pipeline stage: materialize session state from the cookie map.
pub async fn materialize(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let ttl = Duration::from_secs(state.config.session.ttl_secs);

    let presented = req
        .extensions()
        .get::<CookieJar>()
        .and_then(|jar| jar.get(&cookie_name))
        .map(SessionId::from);

    let resumed = match &presented {
        Some(id) => match state.store.get(id).await {
            Ok(Some(record)) => {
                if let Err(e) = state.store.touch(&record.id, ttl).await {
                    return store_outage(e);
                }
                Some(record)
            }
            Ok(None) => None,
            Err(e) => return store_outage(e),
        },
        None => None,
    };

    let (record, fresh) = match resumed {
        Some(record) => {
            metrics::record_session_resumed();
            (record, false)
        }
        None => match state.store.create().await {
            Ok(record) => {
                metrics::record_session_created();
                tracing::debug!(session_id = %record.id, "issued new session");
                (record, true)
            }
            Err(e) => return store_outage(e),
        },
    };

    let set_cookie = fresh.then(|| {
        SessionCookie::new(
            &cookie_name,
            record.id.as_str(),
            state.config.session.ttl_secs,
            state.config.session.same_site,
            state.config.tls_enabled(),
        )
        .build()
    });

    req.extensions_mut().insert(SessionHandle { record, fresh });
    let mut res = next.run(req).await;

    if let Some(cookie) = set_cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    res
}

fn store_outage(e: StoreError) -> Response {
    tracing::error!(error = %e, "session store unavailable, failing request");
    AdmissionError::SessionStoreUnavailable(e).into_response()
}
