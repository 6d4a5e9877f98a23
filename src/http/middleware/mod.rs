//! Admission pipeline middleware.
//!
//! # Stage Order (request path)
//! ```text
//! Incoming request:
//!     → origin.rs   (allow-list gate, CORS headers, preflight)
//!     → headers.rs  (protective headers on the way out, metrics)
//!     → payload decoding (http::payload)
//!     → session.rs  (materialize session state)
//!     → auth.rs     (bind identity context)
//!     → route dispatch
//! ```
//!
//! # Design Decisions
//! - Fail closed: any stage rejection writes its response and stops the
//!   chain; downstream stages never observe the request
//! - Stages communicate through request extensions only
//! - No cross-request state beyond the immutable policies and the store

pub mod auth;
pub mod headers;
pub mod origin;
pub mod session;
