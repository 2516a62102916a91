//! Bearer token authentication middleware.
//!
//! The token gate runs ahead of every `/api` route: it requires an
//! `Authorization: Bearer <token>` header, verifies the token, and attaches
//! the resulting [`AuthenticatedUser`] to the request extensions for the
//! role gate and the handlers downstream.

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use clinic_storage::Role;

use crate::error::AuthError;
use crate::token::JwtService;

// =============================================================================
// Auth State
// =============================================================================

/// State required for bearer token authentication.
#[derive(Clone)]
pub struct AuthState {
    /// JWT service for token issuing and verification.
    pub jwt: Arc<JwtService>,
}

impl AuthState {
    /// Creates a new auth state.
    #[must_use]
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

// =============================================================================
// Authenticated User
// =============================================================================

/// Request-scoped identity derived from a verified token.
///
/// Inserted into request extensions by [`authenticate`] and discarded when
/// the response is sent. Handlers take it as an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Subject id from the token.
    pub id: Uuid,
    /// Role from the token.
    pub role: Role,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or_else(|| AuthError::forbidden("authentication context missing"))
    }
}

// =============================================================================
// Token Gate
// =============================================================================

/// Middleware verifying the bearer token and populating request identity.
///
/// Rejections:
/// - missing `Authorization` header → 401 "missing authentication token"
/// - header not exactly `Bearer <token>` → 401 "invalid token format"
/// - verification failure → 401 "invalid or expired token"
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AuthError::unauthorized("missing authentication token"))?;

    let parts: Vec<&str> = header.split(' ').collect();
    if parts.len() != 2 || parts[0] != "Bearer" {
        return Err(AuthError::unauthorized(
            "invalid token format, expected 'Bearer <token>'",
        ));
    }

    let identity = state.jwt.verify(parts[1]).map_err(|e| {
        tracing::debug!(error = %e, "token verification failed");
        AuthError::unauthorized("invalid or expired token")
    })?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
