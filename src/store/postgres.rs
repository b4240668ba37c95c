//! Postgres-backed session store.
//!
//! # Responsibilities
//! - Own the connection pool
//! - Insert finalized session rows
//! - Apply typed partial updates
//!
//! # Design Decisions
//! - The UPDATE statement's SET clause is assembled from `SessionColumn`
//!   variants only; values travel as bind parameters
//! - A zero-row update is reported as `NotFound`, not silently ignored

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::session::{SessionColumn, SessionRecord, SessionUpdate};
use crate::store::{SessionStore, StoreError};

/// Session store backed by a Postgres `sessions` table (see `schema.sql`).
#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pool and wrap it.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert_session(&self, record: &SessionRecord) -> Result<Uuid, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO sessions
                (id, path, request_body, request_time, response_body,
                 response_time, status, error, duration_ms, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(record.id)
        .bind(record.path.as_str())
        .bind(record.request_body.as_slice())
        .bind(record.request_time)
        .bind(record.response_body.as_deref())
        .bind(record.response_time)
        .bind(record.status)
        .bind(record.error.as_str())
        .bind(record.duration_ms)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_session(&self, id: Uuid, update: &SessionUpdate) -> Result<(), StoreError> {
        let columns = update.columns();
        if columns.is_empty() {
            return Err(StoreError::EmptyUpdate);
        }

        let set_clause = columns
            .iter()
            .enumerate()
            .map(|(position, column)| format!("{} = ${}", column.as_str(), position + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "UPDATE sessions SET {} WHERE id = ${}",
            set_clause,
            columns.len() + 1
        );

        let mut query = sqlx::query(&statement);
        for column in &columns {
            query = match column {
                SessionColumn::ResponseBody => query.bind(update.response_body.as_deref()),
                SessionColumn::ResponseTime => query.bind(update.response_time),
                SessionColumn::Status => query.bind(update.status),
                SessionColumn::Error => query.bind(update.error.as_deref()),
                SessionColumn::DurationMs => query.bind(update.duration_ms),
            };
        }

        let result = query.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
