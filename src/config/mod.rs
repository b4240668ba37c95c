//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → read once at startup, never reloaded
//! ```
//!
//! # Design Decisions
//! - All fields have defaults so a minimal config is valid
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every violation at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, ListenerConfig, ObservabilityConfig, StorageBackend, StorageConfig, UpstreamConfig,
};
