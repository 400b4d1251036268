//! Cookie parsing and formatting for session tokens.
//!
//! Each identity kind has its own pair of cookies so that sessions of
//! different kinds can coexist in one browser.

use axum::http::header;

use crate::identity::IdentityKind;
use crate::session::TokenPair;

/// Cookie name for the access token of `kind`.
pub fn access_cookie_name(kind: IdentityKind) -> &'static str {
    match kind {
        IdentityKind::User => "user_access_token",
        IdentityKind::Artist => "artist_access_token",
        IdentityKind::Admin => "admin_access_token",
    }
}

/// Cookie name for the refresh token of `kind`.
pub fn refresh_cookie_name(kind: IdentityKind) -> &'static str {
    match kind {
        IdentityKind::User => "user_refresh_token",
        IdentityKind::Artist => "artist_refresh_token",
        IdentityKind::Admin => "admin_refresh_token",
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                let value = value.trim();
                return (!value.is_empty()).then_some(value);
            }
        }
    }
    None
}

fn set_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// `Set-Cookie` values delivering both tokens of a pair.
pub fn pair_cookies(pair: &TokenPair, secure: bool) -> [String; 2] {
    let kind = pair.identity.kind;
    [
        set_cookie(
            access_cookie_name(kind),
            &pair.access_token,
            pair.access_ttl().as_secs(),
            secure,
        ),
        set_cookie(
            refresh_cookie_name(kind),
            &pair.refresh_token,
            pair.refresh_ttl().as_secs(),
            secure,
        ),
    ]
}

/// `Set-Cookie` values removing both session cookies of `kind`.
pub fn clear_cookies(kind: IdentityKind, secure: bool) -> [String; 2] {
    [
        set_cookie(access_cookie_name(kind), "", 0, secure),
        set_cookie(refresh_cookie_name(kind), "", 0, secure),
    ]
}
