//! Admission error taxonomy.
//!
//! Every pipeline stage reports failures through [`AdmissionError`]; the
//! HTTP layer maps each variant to a response status and a short
//! plain-text reason. Stage errors are handled where they occur and never
//! propagate to a generic top-level handler.

use axum::http::StatusCode;
use thiserror::Error;

use crate::session::store::StoreError;

/// Failures surfaced by the request admission pipeline.
#[derive(Debug, Error)]
pub enum AdmissionError {
    /// Request origin is not in the allow-list. Client must switch to an
    /// allowed origin; no retry will help.
    #[error("{reason}")]
    OriginRejected { reason: String },

    /// Request body could not be decoded. Client-fixable, no retry.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Request body exceeded the configured size limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// The session store could not serve the request. Transient; safe to
    /// retry with backoff.
    #[error("session store unavailable")]
    SessionStoreUnavailable(#[from] StoreError),
}

impl AdmissionError {
    /// HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::OriginRejected { .. } => StatusCode::FORBIDDEN,
            Self::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::SessionStoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
