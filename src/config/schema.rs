//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML and carry
//! defaults so a minimal (or empty) config file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream forwarding configuration.
    pub upstream: UpstreamConfig,

    /// Session storage configuration.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8084").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8084".to_string(),
        }
    }
}

/// Upstream forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every request is forwarded to (scheme + authority, no
    /// trailing slash).
    pub base_url: String,

    /// Route prefix under which any method and path is proxied.
    pub route_prefix: String,

    /// Per-request timeout in milliseconds, covering connect through the
    /// last response byte.
    pub request_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:9000".to_string(),
            route_prefix: "/api/v1/service".to_string(),
            request_timeout_ms: 5_000,
        }
    }
}

/// Session storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend holding session records.
    pub backend: StorageBackend,

    /// Postgres connection URL (postgres backend only).
    pub database_url: String,

    /// Maximum connections held by the pool.
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Postgres,
            database_url: "postgres://localhost/audit_proxy".to_string(),
            max_connections: 5,
        }
    }
}

/// Available session store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Durable store backed by Postgres.
    Postgres,
    /// Process-local store for development runs.
    Memory,
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Expose `GET /metrics` on the main listener.
    pub metrics_enabled: bool,

    /// Log filter applied when RUST_LOG is unset.
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            log_filter: "audit_proxy=info,tower_http=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8084");
        assert_eq!(config.upstream.request_timeout_ms, 5_000);
        assert_eq!(config.storage.backend, StorageBackend::Postgres);
        assert!(config.observability.metrics_enabled);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [upstream]
            base_url = "http://10.0.0.5:8080"

            [storage]
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.upstream.route_prefix, "/api/v1/service");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }
}
