pub mod api;
pub mod auth;
pub mod cleanup;
pub mod cli;
pub mod db;
pub mod identity;
pub mod jwt;
pub mod session;

use api::create_api_router;
use auth::add_rotated_cookies;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use db::Database;
use jwt::TokenCodec;
use session::{SessionGuard, SessionStore, TokenFactory};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub struct ServerConfig {
    /// Session store backing every issued token
    pub store: Arc<dyn SessionStore>,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Lifetime of access tokens
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens
    pub refresh_ttl: Duration,
    /// Upper bound for a single session store call
    pub store_timeout: Duration,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Frontend origin allowed to call the API with credentials
    pub cors_origin: Option<HeaderValue>,
}

impl ServerConfig {
    /// Build a session guard from this configuration.
    /// Guards built from the same config share the store and accept each other's tokens.
    pub fn guard(&self) -> Arc<SessionGuard> {
        let codec = Arc::new(TokenCodec::new(&self.jwt_secret));
        let factory = TokenFactory::new(codec.clone(), self.access_ttl, self.refresh_ttl);
        Arc::new(SessionGuard::new(
            codec,
            factory,
            self.store.clone(),
            self.store_timeout,
        ))
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let api_router = create_api_router(config.guard(), config.secure_cookies)
        .layer(middleware::from_fn(add_rotated_cookies));

    let app = Router::new().nest("/api", api_router);

    match &config.cors_origin {
        Some(origin) => app.layer(cors_layer(origin.clone())),
        None => app,
    }
}

/// Credentialed CORS for a single frontend origin.
fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Run cleanup tasks and spawn background scheduler.
/// Call this before starting the server.
pub async fn init_cleanup(db: &Database) {
    cleanup::run_cleanup(db).await;
    cleanup::spawn_cleanup_scheduler(db.clone());
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, create_app(&config)).await
}
