//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use super::cookie::{ACCESS_COOKIE_NAME, get_cookie};
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthState;
use super::types::AuthenticatedUser;
use crate::jwt::TokenPurpose;

/// Core identity resolution shared by the extractors.
///
/// Reads the access-token cookie and verifies it against the access secret.
/// No database round-trip happens here; the token is self-contained.
fn authenticate_request<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthState + Send + Sync,
{
    let token =
        get_cookie(&parts.headers, ACCESS_COOKIE_NAME).ok_or(AuthErrorKind::NotAuthenticated)?;

    let claims = state
        .jwt()
        .verify(token, TokenPurpose::Access)
        .map_err(AuthErrorKind::from)?;

    let user_uuid =
        Uuid::parse_str(&claims.sub).map_err(|_| AuthErrorKind::InvalidSubject)?;

    Ok(AuthenticatedUser { user_uuid, claims })
}

/// Extractor for endpoints that require authentication.
///
/// Acts as the authorization gate: a failed resolution rejects the request
/// with a 401 before the handler runs, so protected handlers never execute
/// with an unresolved identity.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthState + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state)
            .map(Auth)
            .map_err(ApiAuthError::from)
    }
}
