//! Per-request session validation and refresh-token rotation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::AuthError;
use super::factory::{TokenFactory, TokenPair};
use super::store::{SessionStore, StoreError};
use crate::identity::{IdentityKind, IdentityRef};
use crate::jwt::{CodecError, TokenClaims, TokenCodec, TokenPurpose};

/// Default bound on a single session store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// A successfully authenticated request.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub identity: IdentityRef,
    /// Access session the request is now running under
    pub session_id: Uuid,
    /// New pair to hand back to the client when the refresh token was used
    pub rotated: Option<TokenPair>,
}

/// Validates presented tokens against the session store and rotates refresh tokens.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct SessionGuard {
    codec: Arc<TokenCodec>,
    factory: TokenFactory,
    store: Arc<dyn SessionStore>,
    store_timeout: Duration,
}

impl SessionGuard {
    pub fn new(
        codec: Arc<TokenCodec>,
        factory: TokenFactory,
        store: Arc<dyn SessionStore>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            factory,
            store,
            store_timeout,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Mint a session for an identity whose credentials were verified elsewhere.
    pub async fn issue(&self, identity: IdentityRef) -> Result<TokenPair, AuthError> {
        let pair = self
            .factory
            .create_pair(identity)
            .map_err(AuthError::Signing)?;
        self.persist(&pair).await?;
        Ok(pair)
    }

    /// Authenticate a request carrying an access and a refresh token.
    ///
    /// The access token is tried first. If it is missing, invalid, expired or
    /// its session is gone, the refresh token is consumed and a new pair is
    /// returned in [`Authenticated::rotated`].
    pub async fn authenticate(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
        expected: IdentityKind,
    ) -> Result<Authenticated, AuthError> {
        if let Some(token) = access_token {
            match self.codec.decode_as(token, TokenPurpose::Access) {
                Ok(claims) => {
                    if self.is_live(&claims).await? {
                        if claims.kind != expected {
                            return Err(AuthError::KindMismatch);
                        }
                        return Ok(Authenticated {
                            identity: IdentityRef::new(claims.identity_id, claims.kind),
                            session_id: claims.session_id,
                            rotated: None,
                        });
                    }
                    debug!(session_id = %claims.session_id, "Access session not live");
                }
                Err(e) => debug!(error = %e, "Access token rejected"),
            }
        }

        self.rotate(refresh_token, expected).await
    }

    async fn rotate(
        &self,
        refresh_token: Option<&str>,
        expected: IdentityKind,
    ) -> Result<Authenticated, AuthError> {
        let token = refresh_token.ok_or(AuthError::MissingRefreshToken)?;

        let claims = match self.codec.decode_as(token, TokenPurpose::Refresh) {
            Ok(claims) => claims,
            Err(CodecError::Expired) => return Err(AuthError::RefreshExpired),
            Err(e) => return Err(AuthError::InvalidRefreshToken(e)),
        };

        if !self.is_live(&claims).await? {
            return Err(AuthError::RefreshRevoked);
        }

        if claims.kind != expected {
            return Err(AuthError::KindMismatch);
        }

        let identity = IdentityRef::new(claims.identity_id, claims.kind);
        let pair = self
            .factory
            .create_pair(identity)
            .map_err(AuthError::Signing)?;

        // The new sessions must be stored before the old refresh session goes away.
        self.persist(&pair).await?;

        let consumed = self.bounded(self.store.delete(claims.session_id)).await?;
        if !consumed {
            // Another request consumed this refresh token between our check and delete.
            if let Err(e) = self
                .logout(pair.access_session_id, pair.refresh_session_id)
                .await
            {
                warn!(error = %e, "Failed to discard sessions of a lost rotation");
            }
            return Err(AuthError::RefreshRevoked);
        }

        debug!(
            identity_id = identity.id,
            kind = %identity.kind,
            old_session_id = %claims.session_id,
            new_session_id = %pair.refresh_session_id,
            "Rotated refresh token"
        );

        Ok(Authenticated {
            identity,
            session_id: pair.access_session_id,
            rotated: Some(pair),
        })
    }

    /// Delete one session. Deleting an absent session is not an error.
    pub async fn revoke(&self, session_id: Uuid) -> Result<(), AuthError> {
        self.bounded(self.store.delete(session_id)).await.map(|_| ())
    }

    /// Delete both sessions of a pair. Both deletes are attempted even if the first fails.
    pub async fn logout(
        &self,
        access_session_id: Uuid,
        refresh_session_id: Uuid,
    ) -> Result<(), AuthError> {
        let access = self.revoke(access_session_id).await;
        let refresh = self.revoke(refresh_session_id).await;
        access.and(refresh)
    }

    async fn persist(&self, pair: &TokenPair) -> Result<(), AuthError> {
        let identity_id = pair.identity.id;
        self.bounded(
            self.store
                .save(pair.access_session_id, identity_id, pair.access_ttl()),
        )
        .await?;
        self.bounded(
            self.store
                .save(pair.refresh_session_id, identity_id, pair.refresh_ttl()),
        )
        .await
    }

    /// A session is live when its record exists and belongs to the token's identity.
    async fn is_live(&self, claims: &TokenClaims) -> Result<bool, AuthError> {
        let owner = self.bounded(self.store.exists(claims.session_id)).await?;
        Ok(owner == Some(claims.identity_id))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, AuthError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AuthError::StoreUnavailable(e.to_string())),
            Err(_) => Err(AuthError::StoreUnavailable(format!(
                "timed out after {}ms",
                self.store_timeout.as_millis()
            ))),
        }
    }
}
