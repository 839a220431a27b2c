//! Session issuance: access/refresh token pairs and their cookies.

use super::cookie::{ACCESS_COOKIE_NAME, CookieSettings, REFRESH_COOKIE_NAME};
use crate::jwt::{JwtConfig, JwtError, TokenPurpose};

/// Rendered `Set-Cookie` values for a freshly issued session.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    pub access: String,
    pub refresh: String,
}

/// Issue a full session for the given subject.
///
/// Both tokens are always minted together; login, registration, and
/// external-identity login all go through here. Cookie Max-Age mirrors each
/// token's own lifetime.
pub fn issue_session(
    jwt: &JwtConfig,
    cookies: &CookieSettings,
    subject: &str,
) -> Result<SessionCookies, JwtError> {
    let access = jwt.sign(subject, TokenPurpose::Access)?;
    let refresh = jwt.sign(subject, TokenPurpose::Refresh)?;

    Ok(SessionCookies {
        access: cookies.session_cookie(ACCESS_COOKIE_NAME, &access.token, access.max_age),
        refresh: cookies.session_cookie(REFRESH_COOKIE_NAME, &refresh.token, refresh.max_age),
    })
}

/// Mint a replacement access cookie for the given subject.
///
/// Used by the refresh flow; the refresh token itself is not rotated, it
/// stays valid until its own expiry.
pub fn refresh_access_cookie(
    jwt: &JwtConfig,
    cookies: &CookieSettings,
    subject: &str,
) -> Result<String, JwtError> {
    let access = jwt.sign(subject, TokenPurpose::Access)?;
    Ok(cookies.session_cookie(ACCESS_COOKIE_NAME, &access.token, access.max_age))
}

/// Render the cookie pair that clears a session on logout.
pub fn clear_session(cookies: &CookieSettings) -> SessionCookies {
    SessionCookies {
        access: cookies.clear_cookie(ACCESS_COOKIE_NAME),
        refresh: cookies.clear_cookie(REFRESH_COOKIE_NAME),
    }
}
