//! Cookie-based session authentication.
//!
//! Dual-token system: short-lived access tokens gate protected routes
//! statelessly, a longer-lived refresh token mints replacements through the
//! explicit refresh endpoint. Both travel as HttpOnly cookies whose
//! attributes follow the deployment environment.

mod cookie;
mod errors;
mod extractors;
mod session;
mod state;
mod types;
mod verifier;

pub use cookie::{ACCESS_COOKIE_NAME, CookieSettings, REFRESH_COOKIE_NAME, get_cookie};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::Auth;
pub use session::{SessionCookies, clear_session, issue_session, refresh_access_cookie};
pub use state::HasAuthState;
pub use types::AuthenticatedUser;
pub use verifier::{
    ExternalAssertionVerifier, ExternalAuthError, ExternalIdentity, StaticKeyVerifier,
};
