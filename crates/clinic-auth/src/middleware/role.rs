//! Role gate middleware.
//!
//! Restricts a route group to an allow-list of roles. Runs after the token
//! gate and reads the identity it attached; a request that somehow reaches
//! the gate without one is rejected.
//!
//! # Example
//!
//! ```ignore
//! use axum::middleware;
//! use clinic_storage::Role;
//!
//! let doctor_routes = router.layer(middleware::from_fn(|req, next| {
//!     clinic_auth::middleware::require_role(&[Role::Doctor], req, next)
//! }));
//! ```

use axum::{extract::Request, middleware::Next, response::Response};

use clinic_storage::Role;

use super::auth::AuthenticatedUser;
use crate::error::AuthError;

/// Middleware restricting access to the given roles.
///
/// Rejections (both 403):
/// - no identity in the request extensions
/// - identity role not in the allow-list
pub async fn require_role(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = req
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AuthError::forbidden("access denied: user role not found"))?;

    if !allowed.contains(&identity.role) {
        tracing::debug!(
            user_id = %identity.id,
            role = %identity.role,
            ?allowed,
            "role gate rejected request"
        );
        return Err(AuthError::forbidden(
            "access denied: insufficient permissions for this action",
        ));
    }

    Ok(next.run(req).await)
}
