//! Process-local session store.
//!
//! Backs development runs and the integration tests; same contract as the
//! Postgres store, plus read accessors for inspecting captured sessions.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::store::session::{SessionRecord, SessionUpdate};
use crate::store::{SessionStore, StoreError};

/// In-memory session store keyed by session id.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<Uuid, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a stored session by id.
    pub fn get(&self, id: Uuid) -> Option<SessionRecord> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// All stored sessions, oldest first.
    pub fn all(&self) -> Vec<SessionRecord> {
        let mut sessions: Vec<SessionRecord> =
            self.sessions.iter().map(|entry| entry.value().clone()).collect();
        sessions.sort_by_key(|session| session.request_time);
        sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert_session(&self, record: &SessionRecord) -> Result<Uuid, StoreError> {
        self.sessions.insert(record.id, record.clone());
        Ok(record.id)
    }

    async fn update_session(&self, id: Uuid, update: &SessionUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }
        let mut entry = self.sessions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(body) = &update.response_body {
            entry.response_body = Some(body.clone());
        }
        if let Some(time) = update.response_time {
            entry.response_time = Some(time);
        }
        if let Some(status) = update.status {
            entry.status = Some(status);
        }
        if let Some(error) = &update.error {
            entry.error = error.clone();
        }
        if let Some(duration) = update.duration_ms {
            entry.duration_ms = Some(duration);
        }
        Ok(())
    }
}
