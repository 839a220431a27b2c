//! Authentication user types.

use uuid::Uuid;

use crate::jwt::Claims;

/// Identity reference resolved from a verified access token.
///
/// Carries no database state: authentication does not imply the identity
/// record still exists. Handlers that need the full record perform their
/// own lookup and treat "not found" as distinct from "unauthenticated".
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Identity UUID parsed from the token subject
    pub user_uuid: Uuid,
    /// Verified claims from the access token
    pub claims: Claims,
}
