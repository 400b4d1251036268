//! Session API endpoints, one set per identity kind.
//!
//! - GET `/{kind}` - Check the current session (rotating it if needed)
//! - POST `/{kind}/logout` - Revoke both sessions and clear cookies

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{
    AdminOnly, ApiAuthError, ArtistOnly, Auth, KindConstraint, UserOnly, access_cookie_name,
    clear_cookies, get_cookie, refresh_cookie_name,
};
use crate::identity::IdentityKind;
use crate::impl_has_auth_backend;
use crate::jwt::TokenPurpose;
use crate::session::SessionGuard;

#[derive(Clone)]
pub struct SessionState {
    pub guard: Arc<SessionGuard>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(SessionState);

pub fn router(state: SessionState) -> Router {
    Router::new()
        .route("/user", get(current::<UserOnly>))
        .route("/user/logout", post(logout::<UserOnly>))
        .route("/artist", get(current::<ArtistOnly>))
        .route("/artist/logout", post(logout::<ArtistOnly>))
        .route("/admin", get(current::<AdminOnly>))
        .route("/admin/logout", post(logout::<AdminOnly>))
        .with_state(state)
}

#[derive(Serialize)]
struct SessionInfo {
    identity_id: i64,
    kind: IdentityKind,
    rotated: bool,
}

/// Return the identity behind the current session.
async fn current<K: KindConstraint>(auth: Auth<K>) -> impl IntoResponse {
    Json(SessionInfo {
        identity_id: auth.identity.id,
        kind: auth.identity.kind,
        rotated: auth.rotated,
    })
}

/// Logout - revoke the sessions named by the kind's cookies and clear both cookies.
///
/// Only signature-verified tokens of this kind are honoured. Expired tokens
/// still count, so a session record that outlived its token cannot linger.
/// Both deletes are attempted even if the first one fails.
async fn logout<K: KindConstraint>(
    State(state): State<SessionState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiAuthError> {
    let kind = K::KIND;
    let codec = state.guard.codec();

    let session_of = |name: &str, purpose: TokenPurpose| -> Option<Uuid> {
        let claims = codec.decode_allow_expired(get_cookie(&headers, name)?).ok()?;
        (claims.purpose == purpose && claims.kind == kind).then_some(claims.session_id)
    };

    let sessions = [
        session_of(access_cookie_name(kind), TokenPurpose::Access),
        session_of(refresh_cookie_name(kind), TokenPurpose::Refresh),
    ];

    let mut revoked = Ok(());
    for session_id in sessions.into_iter().flatten() {
        let result = state.guard.revoke(session_id).await;
        revoked = revoked.and(result);
    }
    revoked.map_err(|e| ApiAuthError::new(e, kind, state.secure_cookies))?;

    let [clear_access, clear_refresh] = clear_cookies(kind, state.secure_cookies);

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
        Json(serde_json::json!({ "success": true })),
    ))
}
