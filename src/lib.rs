//! Request admission and session bootstrap for the PEV backend.
//!
//! Every inbound request passes through a fixed admission pipeline before
//! it can reach an application route:
//!
//! ```text
//! request
//!     → origin gate        (allow-list check, CORS headers, preflight)
//!     → protective headers (security header set, cache-control by route class)
//!     → compression        (response body negotiation)
//!     → payload decoders   (cookies, JSON body, urlencoded body)
//!     → session            (resolve or create, Set-Cookie on fresh sessions)
//!     → identity           (principal resolution from session state)
//!     → route dispatch
//! ```
//!
//! A rejection at any stage writes its response immediately; no later
//! stage observes the request. Startup is sequenced separately: the
//! listener only opens after the session store confirms connectivity
//! (see [`lifecycle::startup`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod session;

pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
