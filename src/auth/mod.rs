//! Cookie-based session authentication for axum routes.
//!
//! Dual-token system: short-lived access tokens and long-lived, single-use
//! refresh tokens, both backed by session records. When the access token
//! fails, the extractor rotates the refresh token and the middleware delivers
//! the new pair as cookies.

mod cookie;
mod errors;
mod extractors;
mod state;

pub use cookie::{access_cookie_name, clear_cookies, get_cookie, pair_cookies, refresh_cookie_name};
pub use errors::ApiAuthError;
pub use extractors::{AdminOnly, ArtistOnly, Auth, KindConstraint, UserOnly, add_rotated_cookies};
pub use state::HasAuthBackend;
