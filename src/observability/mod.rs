//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware::LoggingDecorator → logging.rs (structured log events)
//! middleware::MetricsDecorator → metrics.rs (counters, histogram)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → GET /metrics (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics live in one `ProxyMetrics` value passed explicitly to every
//!   consumer; there is no ambient global registry
//! - Log output format and level are controlled via `RUST_LOG` with a
//!   config-supplied fallback filter

pub mod logging;
pub mod metrics;

pub use metrics::ProxyMetrics;
