//! HTTP server for the clinic portal.
//!
//! Wires configuration, tracing, storage, and the auth middleware chain
//! into an axum application.

pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use server::{AppState, ClinicServer, ServerBuilder, build_app};
