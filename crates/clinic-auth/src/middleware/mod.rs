//! Authentication and authorization middleware.
//!
//! Two composable gates: [`authenticate`] verifies the bearer token and
//! populates request identity; [`require_role`] restricts a route group by
//! role membership.

mod auth;
mod role;

pub use auth::{AuthState, AuthenticatedUser, authenticate};
pub use role::require_role;
