//! JWT encoding and validation for session tokens.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::identity::IdentityKind;

/// Token purpose for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Short-lived token checked on every request
    Access,
    /// Long-lived, single-use token exchanged for a new pair
    Refresh,
}

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Identity the session belongs to
    #[serde(rename = "uid")]
    pub identity_id: i64,
    /// Identity kind, fixed at mint time
    pub kind: IdentityKind,
    /// Session identifier mirrored in the session store
    #[serde(rename = "sid")]
    pub session_id: Uuid,
    /// Issued at (Unix timestamp)
    #[serde(rename = "iat")]
    pub issued_at: u64,
    /// Expiration time (Unix timestamp)
    #[serde(rename = "exp")]
    pub expires_at: u64,
    #[serde(rename = "typ")]
    pub purpose: TokenPurpose,
}

/// Signs and verifies session tokens with a single HS256 secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
}

impl TokenCodec {
    /// Create a codec for the given secret.
    /// An empty secret is accepted here but can neither sign nor verify.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            has_secret: !secret.is_empty(),
        }
    }

    pub fn encode(&self, claims: &TokenClaims) -> Result<String, CodecError> {
        if !self.has_secret {
            return Err(CodecError::Signing("signing key is empty".into()));
        }
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| CodecError::Signing(e.to_string()))
    }

    /// Verify the signature and expiry of a token and return its claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, CodecError> {
        self.decode_with(token, true)
    }

    /// Like [`decode`](Self::decode), but rejects tokens minted for the other purpose.
    pub fn decode_as(&self, token: &str, purpose: TokenPurpose) -> Result<TokenClaims, CodecError> {
        let claims = self.decode(token)?;
        if claims.purpose != purpose {
            return Err(CodecError::WrongPurpose);
        }
        Ok(claims)
    }

    /// Verify only the signature. Used where an expired token must still be
    /// attributed to its session, e.g. on logout.
    pub fn decode_allow_expired(&self, token: &str) -> Result<TokenClaims, CodecError> {
        self.decode_with(token, false)
    }

    fn decode_with(&self, token: &str, validate_exp: bool) -> Result<TokenClaims, CodecError> {
        if !self.has_secret {
            return Err(CodecError::BadSignature);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = validate_exp;

        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(CodecError::from)
    }
}

/// Errors that can occur while encoding or decoding tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("malformed token")]
    Malformed,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token expired")]
    Expired,
    /// An access token presented as a refresh token or vice versa
    #[error("token minted for a different purpose")]
    WrongPurpose,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for CodecError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => CodecError::BadSignature,
            ErrorKind::ExpiredSignature => CodecError::Expired,
            _ => CodecError::Malformed,
        }
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
