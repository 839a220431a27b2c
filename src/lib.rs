pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;

use api::create_api_router;
use auth::{CookieSettings, ExternalAssertionVerifier};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use db::Database;
use jwt::JwtConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// CORS origin assumed when none is configured (local frontend dev server).
pub const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Signing secret for access tokens
    pub access_secret: Vec<u8>,
    /// Signing secret for refresh tokens, must differ from the access secret
    pub refresh_secret: Vec<u8>,
    /// Access token lifetime in minutes (nonzero, validated at startup)
    pub access_expire_minutes: u64,
    /// Refresh token lifetime in hours (nonzero, validated at startup)
    pub refresh_expire_hours: u64,
    /// Domain attribute for auth cookies
    pub cookie_domain: Option<String>,
    /// Production deployments get Secure/SameSite=None cookies
    pub production: bool,
    /// Allowed CORS origin of the frontend
    pub frontend_origin: Option<String>,
    /// Verifier for external identity assertions; enables /api/auth/external
    pub external_verifier: Option<Arc<dyn ExternalAssertionVerifier>>,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(
        &config.access_secret,
        &config.refresh_secret,
        config.access_expire_minutes * 60,
        config.refresh_expire_hours * 60 * 60,
    ));

    let cookies = CookieSettings {
        secure: config.production,
        domain: config.cookie_domain.clone(),
    };

    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        cookies,
        config.external_verifier.clone(),
    );

    let origin = config
        .frontend_origin
        .as_deref()
        .unwrap_or(DEFAULT_FRONTEND_ORIGIN);
    let cors = CorsLayer::new()
        .allow_origin(
            origin
                .parse::<HeaderValue>()
                .expect("Invalid frontend origin"),
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new().nest("/api", api_router).layer(cors)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}
