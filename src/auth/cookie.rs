//! Cookie parsing and rendering for authentication.

use axum::http::header;

/// Cookie name for the access token (short-lived).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Transport attributes applied to every auth cookie.
///
/// `secure` is flipped by the production environment flag: deployed
/// instances sit behind HTTPS on another origin and need
/// `Secure; SameSite=None`, while local development over plain HTTP gets
/// `SameSite=Lax` without `Secure` so browsers still deliver the cookie.
#[derive(Debug, Clone, Default)]
pub struct CookieSettings {
    pub secure: bool,
    pub domain: Option<String>,
}

impl CookieSettings {
    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.secure {
            attrs.push_str("; SameSite=None; Secure");
        } else {
            attrs.push_str("; SameSite=Lax");
        }
        if let Some(domain) = &self.domain {
            attrs.push_str("; Domain=");
            attrs.push_str(domain);
        }
        attrs
    }

    /// Render a `Set-Cookie` value carrying a session token.
    /// Max-Age mirrors the token's own lifetime.
    pub fn session_cookie(&self, name: &str, token: &str, max_age_secs: u64) -> String {
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}{}",
            name,
            token,
            max_age_secs,
            self.attributes()
        )
    }

    /// Render a `Set-Cookie` value that clears a cookie immediately.
    pub fn clear_cookie(&self, name: &str) -> String {
        format!("{}=; HttpOnly; Path=/; Max-Age=0{}", name, self.attributes())
    }
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
