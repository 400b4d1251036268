//! Client-facing rendering of authentication failures.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use super::cookie::clear_cookies;
use crate::identity::IdentityKind;
use crate::session::AuthError;

/// Authentication rejection for a route requiring `kind`.
///
/// The precise reason is logged but never sent to the client: every client
/// fault renders as the same 401 and clears the kind's cookies, internal
/// faults render as 500 and leave the cookies alone so a retry can succeed.
#[derive(Debug)]
pub struct ApiAuthError {
    pub error: AuthError,
    kind: IdentityKind,
    secure_cookies: bool,
}

impl ApiAuthError {
    pub fn new(error: AuthError, kind: IdentityKind, secure_cookies: bool) -> Self {
        if error.is_internal() {
            error!(reason = error.reason(), kind = %kind, error = %error, "Authentication failed");
        } else {
            warn!(reason = error.reason(), kind = %kind, "Authentication rejected");
        }
        Self {
            error,
            kind,
            secure_cookies,
        }
    }

    fn status_code(&self) -> StatusCode {
        if self.error.is_internal() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::UNAUTHORIZED
        }
    }

    fn message(&self) -> &'static str {
        if self.error.is_internal() {
            "Internal server error"
        } else {
            "Unauthorized"
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        use axum::Json;
        use serde::Serialize;

        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let mut response = (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        if !self.error.is_internal() {
            let headers = response.headers_mut();
            for cookie in clear_cookies(self.kind, self.secure_cookies) {
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    headers.append(header::SET_COOKIE, value);
                }
            }
        }

        response
    }
}
