//! In-process session store.
//!
//! Expiry is measured on the tokio clock, so tests can pause and advance time.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use super::store::{SessionStore, StoreError};

/// Longest lifetime a record can have; longer TTLs are clamped.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct Entry {
    identity_id: i64,
    expires_at: Instant,
}

#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<Uuid, Entry>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records that have not expired yet.
    pub async fn live_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(
        &self,
        session_id: Uuid,
        identity_id: i64,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(
            session_id,
            Entry {
                identity_id,
                expires_at: now + ttl.min(MAX_TTL),
            },
        );
        Ok(())
    }

    async fn exists(&self, session_id: Uuid) -> Result<Option<i64>, StoreError> {
        let now = Instant::now();
        let entries = self.entries.lock().await;
        Ok(entries
            .get(&session_id)
            .filter(|e| e.expires_at > now)
            .map(|e| e.identity_id))
    }

    async fn delete(&self, session_id: Uuid) -> Result<bool, StoreError> {
        let now = Instant::now();
        let removed = self.entries.lock().await.remove(&session_id);
        Ok(removed.is_some_and(|e| e.expires_at > now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_exists() {
        let store = MemorySessionStore::new();
        let sid = Uuid::new_v4();

        assert_eq!(store.exists(sid).await.unwrap(), None);

        store.save(sid, 42, Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.exists(sid).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemorySessionStore::new();
        let sid = Uuid::new_v4();

        store.save(sid, 1, Duration::from_secs(60)).await.unwrap();
        store.save(sid, 2, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.exists(sid).await.unwrap(), Some(2));
        assert_eq!(store.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemorySessionStore::new();
        let sid = Uuid::new_v4();
        store.save(sid, 42, Duration::from_secs(60)).await.unwrap();

        assert!(store.delete(sid).await.unwrap());
        assert!(!store.delete(sid).await.unwrap());
        assert_eq!(store.exists(sid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let store = MemorySessionStore::new();
        let sid = Uuid::new_v4();

        store.save(sid, 42, Duration::MAX).await.unwrap();

        assert_eq!(store.exists(sid).await.unwrap(), Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_expire_without_sweep() {
        let store = MemorySessionStore::new();
        let short = Uuid::new_v4();
        let long = Uuid::new_v4();
        store.save(short, 1, Duration::from_secs(60)).await.unwrap();
        store.save(long, 2, Duration::from_secs(3600)).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.exists(short).await.unwrap(), None);
        assert_eq!(store.exists(long).await.unwrap(), Some(2));
        // Deleting an expired record does not count as removing a live one
        assert!(!store.delete(short).await.unwrap());
    }
}
