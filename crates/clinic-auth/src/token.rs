//! JWT token issuing and verification.
//!
//! Tokens are signed with HS256 keyed by the configured secret. Verification
//! is pinned to HS256 so tokens carrying any other algorithm in their header
//! are rejected outright (algorithm-confusion defense).

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use clinic_storage::{Role, User};

use crate::config::AuthConfig;
use crate::middleware::AuthenticatedUser;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token (bad signature, unexpected algorithm,
    /// malformed or missing claims).
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The signing secret is missing or empty.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims embedded in every issued token.
///
/// `sub` and `role` are required for verification to succeed; a token
/// missing either, or carrying a wrong-typed value, fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    /// Subject: the user's id.
    pub sub: Uuid,

    /// The user's role at issue time.
    pub role: Role,

    /// Issuer.
    pub iss: String,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,
}

// ============================================================================
// JWT Service
// ============================================================================

/// Issues and verifies bearer tokens for the portal.
///
/// Construct once at startup from [`AuthConfig`] and share behind an `Arc`.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    token_ttl_secs: u64,
}

impl JwtService {
    /// Creates a new JWT service from the auth configuration.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Configuration` if the signing secret is empty.
    pub fn new(config: &AuthConfig) -> Result<Self, JwtError> {
        if config.secret.trim().is_empty() {
            return Err(JwtError::configuration("signing secret is not set"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            token_ttl_secs: config.token_ttl_secs,
        })
    }

    /// Issues a signed token for the given user.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = TokenClaims {
            sub: user.id,
            role: user.role,
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.token_ttl_secs as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Verifies a token string and extracts the authenticated identity.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` for expired tokens and
    /// `JwtError::DecodingError` for any other failure: bad signature,
    /// non-HS256 algorithm, malformed token, missing or wrong-typed claims.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, JwtError> {
        let data =
            decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    _ => JwtError::decoding_error(e.to_string()),
                }
            })?;

        Ok(AuthenticatedUser {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
