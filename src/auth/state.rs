//! Authentication state traits and macro.

use super::cookie::CookieSettings;
use crate::jwt::JwtConfig;

/// Trait for state types that provide token and cookie configuration for
/// authentication.
pub trait HasAuthState {
    fn jwt(&self) -> &JwtConfig;
    fn cookies(&self) -> &CookieSettings;
}

/// Macro to implement `HasAuthState` for state structs with the standard
/// fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `cookies: CookieSettings`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_state;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub jwt: Arc<JwtConfig>,
///     pub cookies: CookieSettings,
///     // ... other fields
/// }
///
/// impl_has_auth_state!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_state {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthState for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn cookies(&self) -> &$crate::auth::CookieSettings {
                &self.cookies
            }
        }
    };
}
