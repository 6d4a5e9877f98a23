//! Error-to-response shaping.
//!
//! Pipeline errors become short plain-text responses; no stack traces or
//! internal state ever reach the client.

use axum::response::{IntoResponse, Response};

use crate::error::AdmissionError;

impl IntoResponse for AdmissionError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
