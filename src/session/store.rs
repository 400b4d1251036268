//! Session store interface.
//!
//! A session store maps live session identifiers to their owning identity.
//! Records expire on their own: an expired record must be invisible to
//! [`SessionStore::exists`] without any external sweep.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

/// Errors from a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store error: {0}")]
    Other(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record `session_id` as owned by `identity_id` for `ttl`. Overwrites any prior record.
    async fn save(&self, session_id: Uuid, identity_id: i64, ttl: Duration)
    -> Result<(), StoreError>;

    /// Return the owning identity if the session is live. Absence is not an error.
    async fn exists(&self, session_id: Uuid) -> Result<Option<i64>, StoreError>;

    /// Delete a session. Returns whether a live record was removed.
    async fn delete(&self, session_id: Uuid) -> Result<bool, StoreError>;
}
