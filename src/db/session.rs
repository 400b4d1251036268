//! SQLite-backed session records.
//!
//! Expiry is enforced by every query, so a record past its `expires_at` is
//! invisible even before [`SqliteSessionStore::delete_expired`] reclaims it.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;
use uuid::Uuid;

use crate::jwt::unix_now;
use crate::session::{SessionStore, StoreError};

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete all expired session rows.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(unix_now() as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save(
        &self,
        session_id: Uuid,
        identity_id: i64,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let expires_at = unix_now().saturating_add(ttl.as_secs());
        let expires_at = i64::try_from(expires_at).unwrap_or(i64::MAX);

        sqlx::query(
            "INSERT INTO sessions (session_id, identity_id, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(session_id) DO UPDATE SET identity_id = excluded.identity_id, expires_at = excluded.expires_at",
        )
        .bind(session_id.to_string())
        .bind(identity_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, session_id: Uuid) -> Result<Option<i64>, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT identity_id FROM sessions WHERE session_id = ? AND expires_at > ?",
        )
        .bind(session_id.to_string())
        .bind(unix_now() as i64)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(identity_id,)| identity_id))
    }

    async fn delete(&self, session_id: Uuid) -> Result<bool, StoreError> {
        let row: Option<(i64,)> =
            sqlx::query_as("DELETE FROM sessions WHERE session_id = ? RETURNING expires_at")
                .bind(session_id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.is_some_and(|(expires_at,)| expires_at > unix_now() as i64))
    }
}
