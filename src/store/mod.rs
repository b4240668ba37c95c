//! Session persistence subsystem.
//!
//! # Data Flow
//! ```text
//! proxy::Forwarder
//!     → SessionRecord (draft, finalized once)
//!     → SessionStore::insert_session (best effort, exactly one attempt)
//!
//! Callers performing partial corrections:
//!     → SessionUpdate (typed, closed column set)
//!     → SessionStore::update_session
//! ```
//!
//! # Design Decisions
//! - The store is a trait so the forwarder never depends on a backend
//! - Insert is not idempotent: each call writes a new row
//! - Store failures never propagate into the handler chain; the forwarder
//!   absorbs them at the call site

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod session;

pub use memory::MemorySessionStore;
pub use postgres::PostgresSessionStore;
pub use session::{RequestParams, SessionColumn, SessionRecord, SessionUpdate};

/// Errors produced by session persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No session row matches the given id.
    #[error("no session found for id {0}")]
    NotFound(Uuid),

    /// A partial update with no fields set; rejected before any statement
    /// is built.
    #[error("session update contains no fields")]
    EmptyUpdate,

    /// Underlying database failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persists and partially updates session rows.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a full row; returns the stored id.
    async fn insert_session(&self, record: &SessionRecord) -> Result<Uuid, StoreError>;

    /// Apply a typed partial update to an existing row.
    async fn update_session(&self, id: Uuid, update: &SessionUpdate) -> Result<(), StoreError>;
}
