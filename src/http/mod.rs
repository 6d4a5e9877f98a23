//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, pipeline assembly)
//!     → middleware/ (origin gate, protective headers, session, identity)
//!     → payload.rs (cookie and body decoding)
//!     → routes.rs (application handlers)
//!     → response.rs (error shaping)
//! ```

pub mod middleware;
pub mod payload;
pub mod response;
pub mod routes;
pub mod server;

pub use server::{AppState, HttpServer};
