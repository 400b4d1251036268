//! Minting of access/refresh token pairs.

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::identity::IdentityRef;
use crate::jwt::{CodecError, TokenClaims, TokenCodec, TokenPurpose, unix_now};

/// Default access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime: 7 days
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A freshly minted access/refresh pair. Never mutated; rotation mints a new one.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub identity: IdentityRef,
    pub access_token: String,
    pub refresh_token: String,
    pub access_session_id: Uuid,
    pub refresh_session_id: Uuid,
    /// Access expiry (Unix seconds)
    pub access_expires_at: u64,
    /// Refresh expiry (Unix seconds)
    pub refresh_expires_at: u64,
}

impl TokenPair {
    /// Remaining lifetime of the access token.
    pub fn access_ttl(&self) -> Duration {
        remaining(self.access_expires_at)
    }

    /// Remaining lifetime of the refresh token.
    pub fn refresh_ttl(&self) -> Duration {
        remaining(self.refresh_expires_at)
    }
}

/// Latest expiry a token can carry; session stores keep timestamps as `i64`.
const MAX_EXPIRES_AT: u64 = i64::MAX as u64;

fn expires_after(now: u64, ttl: Duration) -> u64 {
    now.saturating_add(ttl.as_secs()).min(MAX_EXPIRES_AT)
}

fn remaining(expires_at: u64) -> Duration {
    Duration::from_secs(expires_at.saturating_sub(unix_now()))
}

/// Produces token pairs with configured lifetimes.
#[derive(Clone)]
pub struct TokenFactory {
    codec: Arc<TokenCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenFactory {
    pub fn new(codec: Arc<TokenCodec>, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mint a new pair for `identity`. Does not touch the session store.
    pub fn create_pair(&self, identity: IdentityRef) -> Result<TokenPair, CodecError> {
        let now = unix_now();
        let access_session_id = Uuid::new_v4();
        let refresh_session_id = Uuid::new_v4();
        let access_expires_at = expires_after(now, self.access_ttl);
        let refresh_expires_at = expires_after(now, self.refresh_ttl);

        let access_token = self.codec.encode(&TokenClaims {
            identity_id: identity.id,
            kind: identity.kind,
            session_id: access_session_id,
            issued_at: now,
            expires_at: access_expires_at,
            purpose: TokenPurpose::Access,
        })?;

        let refresh_token = self.codec.encode(&TokenClaims {
            identity_id: identity.id,
            kind: identity.kind,
            session_id: refresh_session_id,
            issued_at: now,
            expires_at: refresh_expires_at,
            purpose: TokenPurpose::Refresh,
        })?;

        Ok(TokenPair {
            identity,
            access_token,
            refresh_token,
            access_session_id,
            refresh_session_id,
            access_expires_at,
            refresh_expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityKind;

    fn factory(secret: &[u8]) -> (TokenFactory, Arc<TokenCodec>) {
        let codec = Arc::new(TokenCodec::new(secret));
        (
            TokenFactory::new(codec.clone(), DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL),
            codec,
        )
    }

    #[test]
    fn test_pair_claims() {
        let (factory, codec) = factory(b"test-secret-key-for-testing");
        let identity = IdentityRef::new(7, IdentityKind::Artist);

        let pair = factory.create_pair(identity).unwrap();

        let access = codec
            .decode_as(&pair.access_token, TokenPurpose::Access)
            .unwrap();
        assert_eq!(access.identity_id, 7);
        assert_eq!(access.kind, IdentityKind::Artist);
        assert_eq!(access.session_id, pair.access_session_id);
        assert_eq!(access.expires_at, pair.access_expires_at);

        let refresh = codec
            .decode_as(&pair.refresh_token, TokenPurpose::Refresh)
            .unwrap();
        assert_eq!(refresh.identity_id, 7);
        assert_eq!(refresh.kind, IdentityKind::Artist);
        assert_eq!(refresh.session_id, pair.refresh_session_id);
        assert_eq!(refresh.expires_at, pair.refresh_expires_at);
    }

    #[test]
    fn test_expiry_uses_configured_durations() {
        let codec = Arc::new(TokenCodec::new(b"test-secret"));
        let factory = TokenFactory::new(
            codec,
            Duration::from_secs(60),
            Duration::from_secs(2 * 24 * 60 * 60),
        );

        let before = unix_now();
        let pair = factory
            .create_pair(IdentityRef::new(1, IdentityKind::User))
            .unwrap();
        let after = unix_now();

        assert!(pair.access_expires_at >= before + 60 && pair.access_expires_at <= after + 60);
        assert!(pair.refresh_expires_at >= before + 2 * 24 * 60 * 60);
        assert!(pair.refresh_ttl() > pair.access_ttl());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let codec = Arc::new(TokenCodec::new(b"test-secret"));
        let factory = TokenFactory::new(codec.clone(), Duration::MAX, Duration::MAX);

        let pair = factory
            .create_pair(IdentityRef::new(1, IdentityKind::User))
            .unwrap();

        assert_eq!(pair.refresh_expires_at, i64::MAX as u64);
        assert!(pair.refresh_ttl() > DEFAULT_REFRESH_TTL);
        assert!(
            codec
                .decode_as(&pair.refresh_token, TokenPurpose::Refresh)
                .is_ok()
        );
    }

    #[test]
    fn test_unique_session_ids() {
        let (factory, _) = factory(b"test-secret");
        let identity = IdentityRef::new(1, IdentityKind::User);

        let p1 = factory.create_pair(identity).unwrap();
        let p2 = factory.create_pair(identity).unwrap();

        assert_ne!(p1.access_session_id, p1.refresh_session_id);
        assert_ne!(p1.access_session_id, p2.access_session_id);
        assert_ne!(p1.refresh_session_id, p2.refresh_session_id);
    }

    #[test]
    fn test_missing_key_is_signing_error() {
        let (factory, _) = factory(b"");

        let result = factory.create_pair(IdentityRef::new(1, IdentityKind::Admin));

        assert!(matches!(result, Err(CodecError::Signing(_))));
    }
}
