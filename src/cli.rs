//! CLI argument parsing, validation, and startup helpers.
//!
//! Every authentication setting is a fatal startup concern: missing or
//! undersized secrets, zero or unparsable durations, and identical
//! access/refresh secrets all abort before the server binds.

use crate::ServerConfig;
use crate::auth::{ExternalAssertionVerifier, StaticKeyVerifier};
use crate::db::Database;
use axum::http::HeaderValue;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

const MIN_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "finflow", about = "Personal finance tracking backend")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE", default_value = "finflow.db")]
    pub database: String,

    /// Signing secret for access tokens
    #[arg(long, env = "ACCESS_SECRET", hide_env_values = true)]
    pub access_secret: Option<String>,

    /// Signing secret for refresh tokens
    #[arg(long, env = "REFRESH_SECRET", hide_env_values = true)]
    pub refresh_secret: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_EXPIRE_MINUTES", default_value = "15",
        value_parser = parse_nonzero_u64)]
    pub access_expire_minutes: u64,

    /// Refresh token lifetime in hours
    #[arg(long, env = "REFRESH_EXPIRE_HOURS", default_value = "72",
        value_parser = parse_nonzero_u64)]
    pub refresh_expire_hours: u64,

    /// Domain attribute for auth cookies
    #[arg(long, env = "COOKIE_DOMAIN")]
    pub cookie_domain: Option<String>,

    /// Deployment environment; "production" enables Secure and SameSite=None cookies
    #[arg(long, env = "ENV", default_value = "development")]
    pub environment: String,

    /// Allowed CORS origin of the frontend
    #[arg(long, env = "FRONTEND_ORIGIN")]
    pub frontend_origin: Option<String>,

    /// Shared secret for verifying external identity assertions.
    /// Enables the /api/auth/external endpoint when set
    #[arg(long, env = "EXTERNAL_ASSERTION_SECRET", hide_env_values = true)]
    pub external_assertion_secret: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn parse_nonzero_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("Not a valid duration: {}", s))?;
    if value == 0 {
        return Err("Duration must be nonzero".to_string());
    }
    Ok(value)
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Validate the token signing secrets.
/// Returns None and logs an error if they are unusable.
pub fn load_secrets(args: &Args) -> Option<(Vec<u8>, Vec<u8>)> {
    let Some(access) = args.access_secret.as_deref() else {
        error!("ACCESS_SECRET is required");
        return None;
    };
    let Some(refresh) = args.refresh_secret.as_deref() else {
        error!("REFRESH_SECRET is required");
        return None;
    };

    if access.len() < MIN_SECRET_LENGTH || refresh.len() < MIN_SECRET_LENGTH {
        error!(
            "Token secrets must be at least {} characters. Use longer secrets",
            MIN_SECRET_LENGTH
        );
        return None;
    }

    // One shared secret would make access and refresh tokens interchangeable
    if access == refresh {
        error!("ACCESS_SECRET and REFRESH_SECRET must differ");
        return None;
    }

    Some((access.as_bytes().to_vec(), refresh.as_bytes().to_vec()))
}

/// Validate the frontend origin for the CORS layer.
/// Returns None and logs an error if it cannot be used as a header value.
pub fn validate_frontend_origin(origin: Option<&str>) -> Option<Option<String>> {
    match origin {
        None => Some(None),
        Some(origin) => {
            if origin.parse::<HeaderValue>().is_err()
                || !(origin.starts_with("http://") || origin.starts_with("https://"))
            {
                error!(origin = %origin, "Invalid frontend origin");
                return None;
            }
            Some(Some(origin.to_string()))
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    args: &Args,
    db: Database,
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    frontend_origin: Option<String>,
) -> ServerConfig {
    let production = args.environment == "production";

    let external_verifier = args
        .external_assertion_secret
        .as_deref()
        .map(|secret| {
            Arc::new(StaticKeyVerifier::new(secret.as_bytes())) as Arc<dyn ExternalAssertionVerifier>
        });

    ServerConfig {
        db,
        access_secret,
        refresh_secret,
        access_expire_minutes: args.access_expire_minutes,
        refresh_expire_hours: args.refresh_expire_hours,
        cookie_domain: args.cookie_domain.clone(),
        production,
        frontend_origin,
        external_verifier,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["finflow"])
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = Args::try_parse_from(["finflow", "--access-expire-minutes", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unparsable_duration_rejected() {
        let result = Args::try_parse_from(["finflow", "--refresh-expire-hours", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_secrets_rejected() {
        let args = base_args();
        assert!(load_secrets(&args).is_none());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut args = base_args();
        args.access_secret = Some("short".to_string());
        args.refresh_secret = Some("also-short".to_string());
        assert!(load_secrets(&args).is_none());
    }

    #[test]
    fn test_shared_secret_rejected() {
        let mut args = base_args();
        let secret = "one-secret-shared-for-both-purposes!".to_string();
        args.access_secret = Some(secret.clone());
        args.refresh_secret = Some(secret);
        assert!(load_secrets(&args).is_none());
    }

    #[test]
    fn test_valid_secrets_accepted() {
        let mut args = base_args();
        args.access_secret = Some("access-secret-for-testing-0123456789".to_string());
        args.refresh_secret = Some("refresh-secret-for-testing-012345678".to_string());
        let (access, refresh) = load_secrets(&args).unwrap();
        assert_ne!(access, refresh);
    }

    #[test]
    fn test_frontend_origin_validation() {
        assert_eq!(validate_frontend_origin(None), Some(None));
        assert!(validate_frontend_origin(Some("https://app.example.com")).is_some());
        assert!(validate_frontend_origin(Some("not a url")).is_none());
    }
}
