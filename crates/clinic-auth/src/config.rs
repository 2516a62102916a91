//! Auth configuration.

use serde::{Deserialize, Serialize};

/// Configuration for token issuing and verification.
///
/// Loaded once at startup and passed into [`crate::token::JwtService`]
/// explicitly; nothing here is read from the process environment at call
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing secret. Must be non-empty.
    #[serde(default)]
    pub secret: String,

    /// Issuer claim embedded in every token.
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

fn default_issuer() -> String {
    "clinic-portal".to_string()
}

fn default_token_ttl_secs() -> u64 {
    // 24 hours
    86_400
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: default_issuer(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.trim().is_empty() {
            return Err("auth.secret must not be empty".into());
        }
        if self.token_ttl_secs == 0 {
            return Err("auth.token_ttl_secs must be > 0".into());
        }
        Ok(())
    }
}
