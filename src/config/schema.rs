//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! server. All types derive Serde traits for deserialization from config
//! files.

use serde::{Deserialize, Serialize};

/// Root configuration for the backend server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Cross-origin admission policy.
    pub origins: OriginConfig,

    /// Session cookie and lifetime settings.
    pub session: SessionConfig,

    /// Protective response headers and payload limits.
    pub security: SecurityConfig,

    /// Session store backend selection.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

impl ServerConfig {
    /// Whether this deployment terminates TLS itself. Controls the
    /// `Secure` cookie attribute and the HSTS header.
    pub fn tls_enabled(&self) -> bool {
        self.listener.tls.is_some()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Cross-origin admission policy.
///
/// Entries are exact `scheme://host[:port]` strings. Matching is
/// case-sensitive with no wildcard or subdomain expansion: a deployment
/// that must admit `https://app.pabbly.com` as well as
/// `https://pabbly.com` lists both.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OriginConfig {
    /// Origins admitted by the gate, verbatim.
    pub allowed: Vec<String>,
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            allowed: vec![
                "http://localhost:1337".to_string(),
                "http://localhost:3031".to_string(),
                "https://pabbly.com".to_string(),
            ],
        }
    }
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session identifier cookie.
    pub cookie_name: String,

    /// Session lifetime in seconds; also the cookie Max-Age.
    pub ttl_secs: u64,

    /// SameSite attribute on the session cookie.
    pub same_site: SameSite,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "pev.sid".to_string(),
            ttl_secs: 86_400,
            same_site: SameSite::Lax,
        }
    }
}

/// SameSite cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    /// Attribute value as written into the Set-Cookie header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

/// Protective response headers and payload limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// X-Frame-Options value: DENY or SAMEORIGIN.
    pub frame_options: String,

    /// Referrer-Policy value.
    pub referrer_policy: String,

    /// HSTS max-age in seconds. The header is only emitted when TLS is
    /// enabled; browsers ignore it over plain HTTP.
    pub hsts_max_age_secs: u64,

    /// Path prefix classifying dynamic API routes (Cache-Control:
    /// no-store). Everything else is treated as cacheable.
    pub api_prefix: String,

    /// Cache-Control max-age for non-API routes, in seconds.
    pub static_max_age_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            frame_options: "DENY".to_string(),
            referrer_policy: "no-referrer".to_string(),
            hsts_max_age_secs: 31_536_000,
            api_prefix: "/api".to_string(),
            static_max_age_secs: 3_600,
        }
    }
}

/// Session store backend selection.
///
/// Production deployments point this at an external store; the crate
/// itself ships the in-memory backend used for development and tests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend identifier.
    pub backend: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}
