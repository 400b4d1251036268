//! Session issuance, validation and rotation.
//!
//! Every session is a pair of signed tokens: a short-lived access token and a
//! long-lived, single-use refresh token. Each token names a session record in
//! a [`SessionStore`]; a token whose record is gone is treated as revoked even
//! when its signature and expiry are fine.

mod error;
mod factory;
mod guard;
mod memory;
mod store;

pub use error::AuthError;
pub use factory::{DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL, TokenFactory, TokenPair};
pub use guard::{Authenticated, DEFAULT_STORE_TIMEOUT, SessionGuard};
pub use memory::MemorySessionStore;
pub use store::{SessionStore, StoreError};
