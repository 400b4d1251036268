#![allow(dead_code)]

use async_trait::async_trait;
use rotokey::identity::IdentityKind;
use rotokey::jwt::{TokenClaims, TokenCodec, TokenPurpose, unix_now};
use rotokey::session::{
    DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL, MemorySessionStore, SessionGuard, SessionStore,
    StoreError, TokenFactory,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

pub const TEST_SECRET: &[u8] = b"test-jwt-secret-for-testing-only!";

/// Build a guard over `store` with the default lifetimes.
pub fn guard_with(store: Arc<dyn SessionStore>) -> SessionGuard {
    guard_with_timeout(store, Duration::from_secs(2))
}

pub fn guard_with_timeout(store: Arc<dyn SessionStore>, timeout: Duration) -> SessionGuard {
    let codec = Arc::new(TokenCodec::new(TEST_SECRET));
    let factory = TokenFactory::new(codec.clone(), DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL);
    SessionGuard::new(codec, factory, store, timeout)
}

/// Guard over a fresh in-memory store. Returns the store for inspection.
pub fn memory_guard() -> (SessionGuard, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    (guard_with(store.clone()), store)
}

/// Sign a token with arbitrary claims, e.g. an already expired one.
pub fn sign(
    identity_id: i64,
    kind: IdentityKind,
    session_id: Uuid,
    purpose: TokenPurpose,
    expires_in_secs: i64,
) -> String {
    let now = unix_now();
    TokenCodec::new(TEST_SECRET)
        .encode(&TokenClaims {
            identity_id,
            kind,
            session_id,
            issued_at: now,
            expires_at: (now as i64 + expires_in_secs) as u64,
            purpose,
        })
        .expect("Failed to sign test token")
}

/// Store that fails every call.
pub struct FailingStore;

#[async_trait]
impl SessionStore for FailingStore {
    async fn save(&self, _: Uuid, _: i64, _: Duration) -> Result<(), StoreError> {
        Err(StoreError::Other("connection refused".into()))
    }

    async fn exists(&self, _: Uuid) -> Result<Option<i64>, StoreError> {
        Err(StoreError::Other("connection refused".into()))
    }

    async fn delete(&self, _: Uuid) -> Result<bool, StoreError> {
        Err(StoreError::Other("connection refused".into()))
    }
}

/// Store whose every call stalls for `delay` before delegating.
pub struct SlowStore {
    pub inner: MemorySessionStore,
    pub delay: Duration,
}

#[async_trait]
impl SessionStore for SlowStore {
    async fn save(&self, sid: Uuid, id: i64, ttl: Duration) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.save(sid, id, ttl).await
    }

    async fn exists(&self, sid: Uuid) -> Result<Option<i64>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.exists(sid).await
    }

    async fn delete(&self, sid: Uuid) -> Result<bool, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(sid).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Save(Uuid),
    Exists(Uuid),
    Delete(Uuid),
}

/// In-memory store that records the order of mutating and reading calls.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemorySessionStore,
    pub ops: Mutex<Vec<StoreOp>>,
}

impl RecordingStore {
    pub fn ops(&self) -> Vec<StoreOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn save(&self, sid: Uuid, id: i64, ttl: Duration) -> Result<(), StoreError> {
        self.ops.lock().unwrap().push(StoreOp::Save(sid));
        self.inner.save(sid, id, ttl).await
    }

    async fn exists(&self, sid: Uuid) -> Result<Option<i64>, StoreError> {
        self.ops.lock().unwrap().push(StoreOp::Exists(sid));
        self.inner.exists(sid).await
    }

    async fn delete(&self, sid: Uuid) -> Result<bool, StoreError> {
        self.ops.lock().unwrap().push(StoreOp::Delete(sid));
        self.inner.delete(sid).await
    }
}

/// In-memory store whose deletes fail for selected sessions.
#[derive(Default)]
pub struct FailingDeleteStore {
    pub inner: MemorySessionStore,
    failing: Mutex<Vec<Uuid>>,
}

impl FailingDeleteStore {
    pub fn fail_delete_of(&self, sid: Uuid) {
        self.failing.lock().unwrap().push(sid);
    }
}

#[async_trait]
impl SessionStore for FailingDeleteStore {
    async fn save(&self, sid: Uuid, id: i64, ttl: Duration) -> Result<(), StoreError> {
        self.inner.save(sid, id, ttl).await
    }

    async fn exists(&self, sid: Uuid) -> Result<Option<i64>, StoreError> {
        self.inner.exists(sid).await
    }

    async fn delete(&self, sid: Uuid) -> Result<bool, StoreError> {
        if self.failing.lock().unwrap().contains(&sid) {
            return Err(StoreError::Other("disk I/O error".into()));
        }
        self.inner.delete(sid).await
    }
}
