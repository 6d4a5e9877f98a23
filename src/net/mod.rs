//! Network layer subsystem.
//!
//! TLS termination is optional and handled transparently: when the
//! listener config names certificate material, the server serves HTTPS
//! and session cookies pick up the `Secure` attribute.

pub mod tls;
