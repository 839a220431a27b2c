//! JWT token generation and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Token purpose, implied by which secret signed the token.
///
/// Access and refresh tokens carry the same claim structure but are signed
/// with different secrets, so one can never be verified as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    /// Short-lived access token (minutes), gates protected routes.
    Access,
    /// Long-lived refresh token (hours), only mints new access tokens.
    Refresh,
}

/// Signed claim set carried by both token purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity UUID, portable string form)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

#[derive(Clone)]
struct PurposeKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl PurposeKeys {
    fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }
}

/// Configuration for JWT operations: one key pair and lifetime per purpose.
#[derive(Clone)]
pub struct JwtConfig {
    access: PurposeKeys,
    refresh: PurposeKeys,
}

/// Result of signing a token.
#[derive(Debug, Clone)]
pub struct SignedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token lifetime in seconds, mirrored into the cookie Max-Age
    pub max_age: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration.
    ///
    /// Lifetimes and secrets are validated at startup (nonzero durations,
    /// distinct secrets); this constructor assumes validated input.
    pub fn new(
        access_secret: &[u8],
        refresh_secret: &[u8],
        access_ttl_secs: u64,
        refresh_ttl_secs: u64,
    ) -> Self {
        Self {
            access: PurposeKeys::new(access_secret, access_ttl_secs),
            refresh: PurposeKeys::new(refresh_secret, refresh_ttl_secs),
        }
    }

    fn keys(&self, purpose: TokenPurpose) -> &PurposeKeys {
        match purpose {
            TokenPurpose::Access => &self.access,
            TokenPurpose::Refresh => &self.refresh,
        }
    }

    /// Sign a token binding the given subject, using the purpose's secret.
    pub fn sign(&self, subject: &str, purpose: TokenPurpose) -> Result<SignedToken, JwtError> {
        let keys = self.keys(purpose);

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();
        let exp = now + keys.ttl_secs;

        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &keys.encoding)
            .map_err(JwtError::Encoding)?;

        Ok(SignedToken {
            token,
            issued_at: now,
            expires_at: exp,
            max_age: keys.ttl_secs,
        })
    }

    /// Verify a token against the purpose's secret and decode its claims.
    ///
    /// Failure kinds stay distinct so callers can log the real reason while
    /// returning a uniform error to the client.
    pub fn verify(&self, token: &str, purpose: TokenPurpose) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.keys(purpose).decoding, &validation)
                .map_err(|e| match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::Malformed,
                })?;

        Ok(token_data.claims)
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Structurally invalid token or claims
    Malformed,
    /// Past expiry
    Expired,
    /// Authentication tag mismatch (forged or signed for another purpose)
    InvalidSignature,
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::Expired => write!(f, "Token expired"),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
