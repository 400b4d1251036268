mod session;

use axum::Router;
use std::sync::Arc;

use crate::session::SessionGuard;

/// Create the API router.
pub fn create_api_router(guard: Arc<SessionGuard>, secure_cookies: bool) -> Router {
    let session_state = session::SessionState {
        guard,
        secure_cookies,
    };

    Router::new().nest("/session", session::router(session_state))
}
