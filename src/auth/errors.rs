//! Authentication error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::jwt::JwtError;

/// Internal auth error kind used by the core authentication logic.
///
/// The kind is for logs only; clients always receive the same generic 401
/// so they cannot tell a forged token from an expired one.
#[derive(Debug)]
pub enum AuthErrorKind {
    /// No token cookie on the request
    NotAuthenticated,
    /// Structurally invalid token
    Malformed,
    /// Token past its expiry
    Expired,
    /// MAC mismatch (forged, tampered, or wrong purpose)
    InvalidSignature,
    /// Token subject is not a valid identity reference
    InvalidSubject,
}

impl From<JwtError> for AuthErrorKind {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthErrorKind::Expired,
            JwtError::InvalidSignature => AuthErrorKind::InvalidSignature,
            JwtError::Malformed
            | JwtError::Encoding(_)
            | JwtError::TimeError => AuthErrorKind::Malformed,
        }
    }
}

/// Rejection returned by the authorization gate.
///
/// Collapses every [`AuthErrorKind`] to a uniform 401 response. The refresh
/// cookie is deliberately left untouched so the client can still call the
/// refresh endpoint.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }
}

impl From<AuthErrorKind> for ApiAuthError {
    fn from(kind: AuthErrorKind) -> Self {
        Self::new(kind)
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

        tracing::debug!(kind = ?self.kind, "Request rejected by authorization gate");

        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Not authenticated",
            }),
        )
            .into_response()
    }
}
