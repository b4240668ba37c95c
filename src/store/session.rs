//! Session data model.
//!
//! # Responsibilities
//! - Define the durable record of one proxied exchange
//! - Define the inbound parameter contract parsed from request bodies
//! - Define the typed partial-update applied to persisted rows
//!
//! # Design Decisions
//! - A record is created as a draft at forwarding start and finalized
//!   exactly once, on the success or the failure path
//! - Updatable columns are a closed enum; the update statement can only
//!   reference names produced by `SessionColumn::as_str`

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Durable record of one inbound request and its outcome.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Generated at creation, immutable, primary key.
    pub id: Uuid,
    /// Original request path and query, captured verbatim.
    pub path: String,
    /// Raw inbound body bytes, captured before forwarding.
    pub request_body: Vec<u8>,
    /// Timestamp at forwarding start.
    pub request_time: DateTime<Utc>,
    /// Exact bytes delivered to the client.
    pub response_body: Option<Vec<u8>>,
    /// Timestamp when the response was fully read.
    pub response_time: Option<DateTime<Utc>>,
    /// Final HTTP status communicated to the client.
    pub status: Option<i32>,
    /// Failure description; empty on success.
    pub error: String,
    /// Elapsed wall-clock milliseconds between request and response time.
    pub duration_ms: Option<i64>,
    /// Persistence timestamp.
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a draft at forwarding start. Response fields stay unset until
    /// one of the finalize methods runs.
    pub fn new(path: impl Into<String>, request_body: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            request_body,
            request_time: Utc::now(),
            response_body: None,
            response_time: None,
            status: None,
            error: String::new(),
            duration_ms: None,
            created_at: Utc::now(),
        }
    }

    /// Record the outcome of a successfully proxied exchange.
    pub fn finalize_success(&mut self, body: &[u8], status: u16, elapsed: Duration) {
        self.response_body = Some(body.to_vec());
        self.response_time = Some(Utc::now());
        self.status = Some(i32::from(status));
        self.duration_ms = Some(elapsed.as_millis() as i64);
    }

    /// Record a failed exchange along with the synthesized body the client
    /// receives in its place.
    pub fn finalize_failure(
        &mut self,
        body: Vec<u8>,
        detail: impl Into<String>,
        status: u16,
        elapsed: Duration,
    ) {
        self.response_body = Some(body);
        self.error = detail.into();
        self.response_time = Some(Utc::now());
        self.status = Some(i32::from(status));
        self.duration_ms = Some(elapsed.as_millis() as i64);
    }
}

/// Input contract parsed from the inbound body.
///
/// Every field is optional at parse time: only malformed JSON is rejected,
/// matching the transparent-proxy contract. `validate` reports which
/// required fields are missing but is not invoked on the forwarding path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParams {
    pub terminal_id: Option<String>,
    pub amount: Option<i64>,
    pub date_time: Option<String>,
    #[serde(rename = "async")]
    pub is_async: Option<bool>,
    pub key_name: Option<String>,
    pub message: Option<String>,
}

impl RequestParams {
    /// Report missing required fields as a field → message map.
    pub fn validate(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();
        let mut require = |name: &str, present: bool| {
            if !present {
                errors.insert(name.to_string(), "is required".to_string());
            }
        };
        require("terminalId", self.terminal_id.is_some());
        require("amount", self.amount.is_some());
        require("dateTime", self.date_time.is_some());
        require("async", self.is_async.is_some());
        require("keyName", self.key_name.is_some());
        require("message", self.message.is_some());
        errors
    }
}

/// Columns a partial update may touch. The SET clause is assembled from
/// these variants only, so caller-supplied column names are unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionColumn {
    ResponseBody,
    ResponseTime,
    Status,
    Error,
    DurationMs,
}

impl SessionColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionColumn::ResponseBody => "response_body",
            SessionColumn::ResponseTime => "response_time",
            SessionColumn::Status => "status",
            SessionColumn::Error => "error",
            SessionColumn::DurationMs => "duration_ms",
        }
    }
}

/// Typed partial update for a persisted session: one optional field per
/// updatable column.
#[derive(Debug, Clone, Default)]
pub struct SessionUpdate {
    pub response_body: Option<Vec<u8>>,
    pub response_time: Option<DateTime<Utc>>,
    pub status: Option<i32>,
    pub error: Option<String>,
    pub duration_ms: Option<i64>,
}

impl SessionUpdate {
    /// Columns this update touches, in declaration order.
    pub fn columns(&self) -> Vec<SessionColumn> {
        let mut columns = Vec::new();
        if self.response_body.is_some() {
            columns.push(SessionColumn::ResponseBody);
        }
        if self.response_time.is_some() {
            columns.push(SessionColumn::ResponseTime);
        }
        if self.status.is_some() {
            columns.push(SessionColumn::Status);
        }
        if self.error.is_some() {
            columns.push(SessionColumn::Error);
        }
        if self.duration_ms.is_some() {
            columns.push(SessionColumn::DurationMs);
        }
        columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns().is_empty()
    }
}
