//! Pluggable verification of external identity assertions.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Claims asserted about a user by an external identity provider.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: String,
}

/// Errors from external assertion verification.
#[derive(Debug)]
pub enum ExternalAuthError {
    /// The assertion failed signature or structural validation
    InvalidAssertion,
    /// The assertion verified but lacks the claims we need (email, name)
    MissingClaims,
}

impl std::fmt::Display for ExternalAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExternalAuthError::InvalidAssertion => write!(f, "Invalid identity assertion"),
            ExternalAuthError::MissingClaims => {
                write!(f, "Identity assertion is missing required claims")
            }
        }
    }
}

impl std::error::Error for ExternalAuthError {}

/// Seam between the session issuer and whatever asserts external identities.
///
/// The issuer only needs "verify this assertion, give me claims or an
/// error"; how the assertion was produced (OIDC provider, test fixture) is
/// an implementation detail behind this trait.
#[async_trait]
pub trait ExternalAssertionVerifier: Send + Sync {
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, ExternalAuthError>;
}

#[derive(Deserialize)]
struct AssertionClaims {
    email: Option<String>,
    name: Option<String>,
    #[allow(dead_code)]
    exp: u64,
}

/// Verifier for assertions signed with a locally configured key.
///
/// Covers shared-secret deployments and tests. Providers that publish
/// rotating key sets get their own implementation of
/// [`ExternalAssertionVerifier`].
pub struct StaticKeyVerifier {
    decoding: DecodingKey,
    algorithm: Algorithm,
}

impl StaticKeyVerifier {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }
}

#[async_trait]
impl ExternalAssertionVerifier for StaticKeyVerifier {
    async fn verify(&self, assertion: &str) -> Result<ExternalIdentity, ExternalAuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<AssertionClaims>(assertion, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "External assertion rejected");
                ExternalAuthError::InvalidAssertion
            })?;

        let email = data
            .claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(ExternalAuthError::MissingClaims)?;
        let name = data.claims.name.unwrap_or_else(|| email.clone());

        Ok(ExternalIdentity { email, name })
    }
}
