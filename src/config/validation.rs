//! Configuration validation.
//!
//! Semantic checks over a deserialized [`ServerConfig`]; serde already
//! guarantees the syntax. All violations are collected and reported
//! together, not just the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{SameSite, ServerConfig};

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("invalid origin entry '{entry}': {reason}")]
    InvalidOrigin { entry: String, reason: String },

    #[error("session ttl must be greater than zero")]
    ZeroSessionTtl,

    #[error("invalid session cookie name '{0}'")]
    InvalidCookieName(String),

    #[error("SameSite=None requires TLS so the Secure attribute holds")]
    SameSiteNoneWithoutTls,

    #[error("max body size must be greater than zero")]
    ZeroBodyLimit,

    #[error("invalid frame options '{0}', expected DENY or SAMEORIGIN")]
    InvalidFrameOptions(String),

    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("unsupported store backend '{0}'")]
    UnsupportedStoreBackend(String),
}

/// Validate a configuration, returning every violation found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for entry in &config.origins.allowed {
        if let Err(reason) = check_origin_entry(entry) {
            errors.push(ValidationError::InvalidOrigin {
                entry: entry.clone(),
                reason,
            });
        }
    }

    if config.session.ttl_secs == 0 {
        errors.push(ValidationError::ZeroSessionTtl);
    }

    if !is_valid_cookie_name(&config.session.cookie_name) {
        errors.push(ValidationError::InvalidCookieName(
            config.session.cookie_name.clone(),
        ));
    }

    if config.session.same_site == SameSite::None && !config.tls_enabled() {
        errors.push(ValidationError::SameSiteNoneWithoutTls);
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    match config.security.frame_options.as_str() {
        "DENY" | "SAMEORIGIN" => {}
        other => errors.push(ValidationError::InvalidFrameOptions(other.to_string())),
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.store.backend != "memory" {
        errors.push(ValidationError::UnsupportedStoreBackend(
            config.store.backend.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An allow-list entry must be exactly `scheme://host[:port]` with no
/// path, query, fragment, or credentials, because the gate matches the
/// Origin header verbatim.
fn check_origin_entry(entry: &str) -> Result<(), String> {
    if entry.ends_with('/') {
        return Err("trailing slash will never match an Origin header".to_string());
    }

    let url = Url::parse(entry).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{other}'")),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if !matches!(url.path(), "" | "/") {
        return Err("origin must not carry a path".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("origin must not carry a query or fragment".to_string());
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("origin must not carry credentials".to_string());
    }

    Ok(())
}

fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'=' | b'"'))
}
