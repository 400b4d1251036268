//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::identity::{IdentityKind, IdentityRef};
use crate::session::{SessionGuard, SessionStore};
use axum::http::HeaderValue;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// One day.
const MAX_ACCESS_TTL_MINUTES: u64 = 24 * 60;
/// Ten years.
const MAX_REFRESH_TTL_DAYS: u64 = 3650;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rotokey",
    about = "Cookie sessions with single-use refresh token rotation"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "7291")]
    pub port: u16,

    /// Path to SQLite database file holding session records
    #[arg(short, long, default_value = "rotokey.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TTL_MINUTES", default_value = "15",
        value_parser = clap::value_parser!(u64).range(1..=MAX_ACCESS_TTL_MINUTES))]
    pub access_ttl_minutes: u64,

    /// Refresh token lifetime in days
    #[arg(long, env = "REFRESH_TTL_DAYS", default_value = "7",
        value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_TTL_DAYS))]
    pub refresh_ttl_days: u64,

    /// Timeout for a single session store call, in milliseconds
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value = "2000",
        value_parser = clap::value_parser!(u64).range(1..=60_000))]
    pub store_timeout_ms: u64,

    /// Set the Secure flag on session cookies (use behind HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Frontend origin allowed to call the API with cookies (e.g. https://app.example.com)
    #[arg(long, env = "CORS_ORIGIN", value_parser = parse_origin)]
    pub cors_origin: Option<HeaderValue>,

    /// Mint a session for KIND:ID (e.g. admin:1), print its tokens and exit
    #[arg(long, value_name = "KIND:ID", value_parser = parse_identity)]
    pub issue: Option<IdentityRef>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn parse_identity(s: &str) -> Result<IdentityRef, String> {
    let (kind, id) = s
        .split_once(':')
        .ok_or_else(|| format!("Expected KIND:ID, got: {}", s))?;
    let kind: IdentityKind = kind.parse().map_err(|e| format!("{}", e))?;
    let id: i64 = id
        .parse()
        .map_err(|_| format!("Identity id must be an integer: {}", id))?;
    Ok(IdentityRef::new(id, kind))
}

fn parse_origin(s: &str) -> Result<HeaderValue, String> {
    let s = s.trim_end_matches('/');
    if !(s.starts_with("http://") || s.starts_with("https://")) {
        return Err(format!("Origin must start with http:// or https://, got: {}", s));
    }
    HeaderValue::from_str(s).map_err(|e| format!("Invalid origin {}: {}", s, e))
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, store: Arc<dyn SessionStore>, jwt_secret: String) -> ServerConfig {
    let access_ttl = Duration::from_secs(args.access_ttl_minutes.saturating_mul(60));
    let refresh_ttl = Duration::from_secs(args.refresh_ttl_days.saturating_mul(24 * 60 * 60));

    if access_ttl >= refresh_ttl {
        warn!(
            access_ttl_secs = access_ttl.as_secs(),
            refresh_ttl_secs = refresh_ttl.as_secs(),
            "Access tokens outlive refresh tokens; rotation will never happen"
        );
    }

    ServerConfig {
        store,
        jwt_secret: jwt_secret.into_bytes(),
        access_ttl,
        refresh_ttl,
        store_timeout: Duration::from_millis(args.store_timeout_ms),
        secure_cookies: args.secure_cookies,
        cors_origin: args.cors_origin.clone(),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle the --issue flag: mint a session and print its tokens.
pub async fn handle_issue(guard: &SessionGuard, identity: IdentityRef) {
    match guard.issue(identity).await {
        Ok(pair) => {
            println!();
            println!("Session issued for {}:{}", identity.kind, identity.id);
            println!("Access token:  {}", pair.access_token);
            println!("Refresh token: {}", pair.refresh_token);
            println!();
        }
        Err(e) => {
            error!(error = %e, "Failed to issue session");
            std::process::exit(1);
        }
    }
}
