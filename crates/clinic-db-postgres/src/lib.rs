//! PostgreSQL storage backend for the clinic portal.
//!
//! Implements [`clinic_storage::AccountStore`] and
//! [`clinic_storage::PatientStore`] over a shared connection pool. All
//! statements are parameterized; consistency relies on per-statement
//! atomicity only.

pub mod accounts;
pub mod config;
pub mod patients;
pub mod pool;
pub mod schema;

pub use accounts::PgAccountStore;
pub use config::PostgresConfig;
pub use patients::PgPatientStore;
pub use pool::create_pool;
pub use schema::ensure_schema;

pub use sqlx_postgres::PgPool;
