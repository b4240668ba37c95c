//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and URL shapes before startup proceeds
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{AppConfig, StorageBackend};

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidUpstreamUrl(String),
    UnsupportedUpstreamScheme(String),
    TrailingSlashInUpstreamUrl(String),
    InvalidRoutePrefix(String),
    ZeroRequestTimeout,
    MissingDatabaseUrl,
    ZeroPoolSize,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr}")
            }
            ValidationError::InvalidUpstreamUrl(url) => {
                write!(f, "upstream.base_url is not a valid URL: {url}")
            }
            ValidationError::UnsupportedUpstreamScheme(scheme) => {
                write!(f, "upstream.base_url scheme must be http, got: {scheme}")
            }
            ValidationError::TrailingSlashInUpstreamUrl(url) => {
                write!(f, "upstream.base_url must not end with a slash: {url}")
            }
            ValidationError::InvalidRoutePrefix(prefix) => {
                write!(
                    f,
                    "upstream.route_prefix must start with '/' and not end with one: {prefix}"
                )
            }
            ValidationError::ZeroRequestTimeout => {
                write!(f, "upstream.request_timeout_ms must be greater than zero")
            }
            ValidationError::MissingDatabaseUrl => {
                write!(f, "storage.database_url is required for the postgres backend")
            }
            ValidationError::ZeroPoolSize => {
                write!(f, "storage.max_connections must be greater than zero")
            }
        }
    }
}

/// Check all semantic constraints, returning every violation found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let base_url = &config.upstream.base_url;
    match Url::parse(base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UnsupportedUpstreamScheme(
                    url.scheme().to_string(),
                ));
            }
        }
        Err(_) => errors.push(ValidationError::InvalidUpstreamUrl(base_url.clone())),
    }
    if base_url.ends_with('/') {
        errors.push(ValidationError::TrailingSlashInUpstreamUrl(base_url.clone()));
    }

    let prefix = &config.upstream.route_prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidRoutePrefix(prefix.clone()));
    }

    if config.upstream.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.storage.backend == StorageBackend::Postgres
        && config.storage.database_url.is_empty()
    {
        errors.push(ValidationError::MissingDatabaseUrl);
    }
    if config.storage.max_connections == 0 {
        errors.push(ValidationError::ZeroPoolSize);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
