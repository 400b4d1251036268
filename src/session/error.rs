//! Authentication failure taxonomy.

use crate::jwt::CodecError;

/// Why a request could not be authenticated.
///
/// Every variant except [`Signing`](AuthError::Signing) and
/// [`StoreUnavailable`](AuthError::StoreUnavailable) is a client fault.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token kind does not match the required kind")]
    KindMismatch,
    #[error("refresh session has been revoked or already used")]
    RefreshRevoked,
    #[error("refresh token expired")]
    RefreshExpired,
    #[error("invalid refresh token: {0}")]
    InvalidRefreshToken(CodecError),
    #[error("no refresh token presented")]
    MissingRefreshToken,
    #[error("failed to mint tokens: {0}")]
    Signing(CodecError),
    #[error("session store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AuthError {
    /// Whether this is a server-side fault rather than a client rejection.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::Signing(_) | AuthError::StoreUnavailable(_))
    }

    /// Stable identifier for logs.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::KindMismatch => "kind_mismatch",
            AuthError::RefreshRevoked => "refresh_revoked",
            AuthError::RefreshExpired => "refresh_expired",
            AuthError::InvalidRefreshToken(CodecError::BadSignature) => "refresh_bad_signature",
            AuthError::InvalidRefreshToken(CodecError::WrongPurpose) => "refresh_wrong_purpose",
            AuthError::InvalidRefreshToken(_) => "refresh_malformed",
            AuthError::MissingRefreshToken => "missing_refresh_token",
            AuthError::Signing(_) => "signing_error",
            AuthError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}
