//! Axum extractors for authentication.

use std::cell::RefCell;
use std::marker::PhantomData;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::cookie::{access_cookie_name, get_cookie, pair_cookies, refresh_cookie_name};
use super::errors::ApiAuthError;
use super::state::HasAuthBackend;
use crate::identity::{IdentityKind, IdentityRef};

tokio::task_local! {
    /// Task-local storage for the cookies of a freshly rotated token pair.
    /// Used to pass the cookies from the auth extractor to the response middleware.
    static ROTATED_COOKIES: RefCell<Vec<String>>;
}

/// Compile-time identity kind required by a route.
pub trait KindConstraint: Send + Sync + 'static {
    const KIND: IdentityKind;
}

pub struct UserOnly;
pub struct ArtistOnly;
pub struct AdminOnly;

impl KindConstraint for UserOnly {
    const KIND: IdentityKind = IdentityKind::User;
}

impl KindConstraint for ArtistOnly {
    const KIND: IdentityKind = IdentityKind::Artist;
}

impl KindConstraint for AdminOnly {
    const KIND: IdentityKind = IdentityKind::Admin;
}

/// Extractor for endpoints that require a session of kind `K`.
///
/// Validates the kind's access cookie; if that fails, consumes the refresh
/// cookie and queues the rotated pair for [`add_rotated_cookies`].
pub struct Auth<K: KindConstraint> {
    pub identity: IdentityRef,
    pub session_id: Uuid,
    /// Whether this request rotated the refresh token
    pub rotated: bool,
    _kind: PhantomData<fn() -> K>,
}

impl<S, K> FromRequestParts<S> for Auth<K>
where
    S: HasAuthBackend + Send + Sync,
    K: KindConstraint,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let kind = K::KIND;
        let access_token = get_cookie(&parts.headers, access_cookie_name(kind));
        let refresh_token = get_cookie(&parts.headers, refresh_cookie_name(kind));

        let outcome = state
            .guard()
            .authenticate(access_token, refresh_token, kind)
            .await
            .map_err(|e| ApiAuthError::new(e, kind, state.secure_cookies()))?;

        let rotated = match outcome.rotated {
            Some(pair) => {
                let cookies = pair_cookies(&pair, state.secure_cookies());
                if ROTATED_COOKIES
                    .try_with(|cell| cell.borrow_mut().extend(cookies))
                    .is_err()
                {
                    tracing::error!(
                        identity_id = pair.identity.id,
                        "Rotated tokens outside add_rotated_cookies; client keeps the used refresh token"
                    );
                }
                true
            }
            None => false,
        };

        Ok(Auth {
            identity: outcome.identity,
            session_id: outcome.session_id,
            rotated,
            _kind: PhantomData,
        })
    }
}

/// Middleware that appends cookies queued by [`Auth`] after a rotation.
/// Must wrap every router that uses the `Auth` extractor.
pub async fn add_rotated_cookies(request: Request, next: Next) -> Response {
    ROTATED_COOKIES
        .scope(RefCell::new(Vec::new()), async move {
            let mut response = next.run(request).await;
            let cookies = ROTATED_COOKIES.with(|cell| cell.take());
            let headers = response.headers_mut();
            for cookie in cookies {
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    headers.append(header::SET_COOKIE, value);
                }
            }
            response
        })
        .await
}
