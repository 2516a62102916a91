//! Authentication and authorization for the clinic portal.
//!
//! Provides the JWT token service (HS256), Argon2 password hashing, and the
//! axum middleware chain (token gate + role gate).

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::{AuthState, AuthenticatedUser, authenticate, require_role};
pub use password::{hash_password, verify_password};
pub use token::{JwtError, JwtService, TokenClaims};
