//! Protective header policy.
//!
//! A fixed set of security headers on every response — including origin
//! rejections — plus a Cache-Control directive chosen by route class.
//! The set is explicit rather than delegated to a bundle of library
//! defaults:
//!
//! - `X-Content-Type-Options: nosniff`
//! - `X-Frame-Options` (configured, DENY by default)
//! - `Referrer-Policy` (configured, no-referrer by default)
//! - `X-XSS-Protection: 0` (the legacy auditor does more harm than good)
//! - `Strict-Transport-Security` only when TLS terminates here; over
//!   plain HTTP browsers ignore it and it misleads anyone reading the
//!   response
//!
//! Handlers may set their own Cache-Control; the policy only fills it in
//! when absent. Everything else is enforced unconditionally.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config::schema::SecurityConfig;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Precomputed header values, built once at startup.
pub struct HeaderPolicy {
    nosniff: HeaderValue,
    frame_options: HeaderValue,
    referrer_policy: HeaderValue,
    xss_protection: HeaderValue,
    hsts: Option<HeaderValue>,
    cache_api: HeaderValue,
    cache_default: HeaderValue,
    api_prefix: String,
}

impl HeaderPolicy {
    pub fn from_config(security: &SecurityConfig, tls_enabled: bool) -> Self {
        let hsts = tls_enabled.then(|| {
            let value = format!(
                "max-age={}; includeSubDomains",
                security.hsts_max_age_secs
            );
            HeaderValue::from_str(&value)
                .unwrap_or_else(|_| HeaderValue::from_static("max-age=31536000"))
        });
        let cache_default = HeaderValue::from_str(&format!(
            "public, max-age={}",
            security.static_max_age_secs
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));

        Self {
            nosniff: HeaderValue::from_static("nosniff"),
            frame_options: HeaderValue::from_str(&security.frame_options)
                .unwrap_or_else(|_| HeaderValue::from_static("DENY")),
            referrer_policy: HeaderValue::from_str(&security.referrer_policy)
                .unwrap_or_else(|_| HeaderValue::from_static("no-referrer")),
            xss_protection: HeaderValue::from_static("0"),
            hsts,
            cache_api: HeaderValue::from_static("no-store"),
            cache_default,
            api_prefix: security.api_prefix.clone(),
        }
    }

    /// Whether a request path falls in the dynamic API route class.
    pub fn is_api_route(&self, path: &str) -> bool {
        path.starts_with(&self.api_prefix)
    }

    /// Stamp the protective set onto a response.
    pub fn apply(&self, is_api_route: bool, headers: &mut HeaderMap) {
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, self.nosniff.clone());
        headers.insert(header::X_FRAME_OPTIONS, self.frame_options.clone());
        headers.insert(header::REFERRER_POLICY, self.referrer_policy.clone());
        headers.insert(header::X_XSS_PROTECTION, self.xss_protection.clone());
        if let Some(hsts) = &self.hsts {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, hsts.clone());
        }
        if !headers.contains_key(header::CACHE_CONTROL) {
            let directive = if is_api_route {
                self.cache_api.clone()
            } else {
                self.cache_default.clone()
            };
            headers.insert(header::CACHE_CONTROL, directive);
        }
    }
}

/// Pipeline stage: protective headers on the way out, plus the request
/// metrics sample. Sits outside the origin gate so rejections are
/// covered too.
pub async fn apply(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let is_api_route = state.header_policy.is_api_route(req.uri().path());

    let mut res = next.run(req).await;

    state
        .header_policy
        .apply(is_api_route, res.headers_mut());
    metrics::record_request(method.as_str(), res.status().as_u16(), start);
    res
}
