//! Origin gate.
//!
//! First stage of the pipeline: nothing downstream spends work on a
//! disallowed origin. Requests without an Origin header are admitted —
//! same-origin navigations and non-browser clients do not send one. That
//! choice weakens protection against some cross-origin vectors (any
//! client able to suppress the header bypasses the gate) and is made
//! deliberately; deployments wanting stricter behavior put a CSRF check
//! behind the gate.
//!
//! Matching is exact-string: case-sensitive, no trailing-slash
//! normalization, no subdomain wildcarding. A deployment serving
//! `app.pabbly.com` and `pabbly.com` lists both. This forgoes
//! pattern-matching flexibility in exchange for a rule that cannot be
//! confused by crafted origins.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AdmissionError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Outcome of evaluating a request's Origin header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginDecision {
    Accepted,
    Rejected { reason: String, status: StatusCode },
}

/// Immutable origin admission policy, built once at startup.
pub struct OriginPolicy {
    allowed: Vec<String>,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl OriginPolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed,
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            allow_headers: HeaderValue::from_static(
                "Content-Type, Content-Length, Accept-Encoding, X-Requested-With, \
                 Authorization, accept, file-name, x-csrf-token",
            ),
        }
    }

    /// Evaluate an Origin header value against the allow-list.
    ///
    /// The rejection reason is a fixed string: allow-list contents never
    /// leak to rejected clients.
    pub fn evaluate(&self, origin: Option<&str>) -> OriginDecision {
        match origin {
            None => OriginDecision::Accepted,
            Some(origin) if self.allowed.iter().any(|entry| entry == origin) => {
                OriginDecision::Accepted
            }
            Some(_) => OriginDecision::Rejected {
                reason: "origin not allowed by access policy".to_string(),
                status: StatusCode::FORBIDDEN,
            },
        }
    }

    /// Add CORS response headers for an admitted cross-origin request.
    pub fn decorate(&self, headers: &mut HeaderMap, origin: HeaderValue) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    /// Answer a preflight request. 200 rather than 204: some legacy
    /// browsers choke on 204 here.
    pub fn preflight(&self, origin: HeaderValue) -> Response {
        let mut res = StatusCode::OK.into_response();
        self.decorate(res.headers_mut(), origin);
        let headers = res.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
        res
    }
}

/// Pipeline stage: admit or reject by Origin header.
pub async fn enforce(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match state.origin_policy.evaluate(origin.as_deref()) {
        OriginDecision::Rejected { reason, .. } => {
            metrics::record_origin_rejection();
            tracing::warn!(
                origin = origin.as_deref().unwrap_or_default(),
                "request rejected at the origin gate"
            );
            AdmissionError::OriginRejected { reason }.into_response()
        }
        OriginDecision::Accepted => {
            let Some(origin) = origin else {
                return next.run(req).await;
            };
            let Ok(origin_value) = HeaderValue::from_str(&origin) else {
                return next.run(req).await;
            };
            if req.method() == Method::OPTIONS {
                state.origin_policy.preflight(origin_value)
            } else {
                let mut res = next.run(req).await;
                state.origin_policy.decorate(res.headers_mut(), origin_value);
                res
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OriginPolicy {
        OriginPolicy::new(vec![
            "http://localhost:1337".to_string(),
            "https://pabbly.com".to_string(),
        ])
    }

    #[test]
    fn test_listed_origin_accepted() {
        assert_eq!(
            policy().evaluate(Some("https://pabbly.com")),
            OriginDecision::Accepted
        );
    }

    #[test]
    fn test_unlisted_origin_rejected_403() {
        match policy().evaluate(Some("https://evil.example")) {
            OriginDecision::Rejected { status, .. } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
            }
            OriginDecision::Accepted => panic!("evil origin was admitted"),
        }
    }

    #[test]
    fn test_absent_origin_accepted() {
        assert_eq!(policy().evaluate(None), OriginDecision::Accepted);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert!(matches!(
            policy().evaluate(Some("HTTPS://PABBLY.COM")),
            OriginDecision::Rejected { .. }
        ));
    }

    #[test]
    fn test_no_trailing_slash_normalization() {
        assert!(matches!(
            policy().evaluate(Some("https://pabbly.com/")),
            OriginDecision::Rejected { .. }
        ));
    }

    #[test]
    fn test_no_subdomain_wildcarding() {
        assert!(matches!(
            policy().evaluate(Some("https://app.pabbly.com")),
            OriginDecision::Rejected { .. }
        ));
    }

    #[test]
    fn test_rejection_reason_does_not_leak_allow_list() {
        let policy = policy();
        if let OriginDecision::Rejected { reason, .. } =
            policy.evaluate(Some("https://evil.example"))
        {
            assert!(!reason.contains("pabbly"));
            assert!(!reason.contains("localhost"));
        } else {
            panic!("expected rejection");
        }
    }

    #[test]
    fn test_preflight_carries_cors_headers() {
        let res = policy().preflight(HeaderValue::from_static("https://pabbly.com"));
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://pabbly.com"
        );
        assert!(res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap()
            .contains("POST"));
    }
}
