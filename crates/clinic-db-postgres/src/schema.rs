//! Schema bootstrap.
//!
//! Creates the two tables on startup if they do not exist. Identifiers are
//! generated server-side with `gen_random_uuid()` (pgcrypto).

use sqlx_core::query::query;
use sqlx_postgres::PgPool;
use tracing::debug;

use clinic_storage::StorageError;

const CREATE_PGCRYPTO: &str = "CREATE EXTENSION IF NOT EXISTS pgcrypto";

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name text NOT NULL,
    email text NOT NULL UNIQUE,
    password_hash text NOT NULL,
    role text NOT NULL
)
"#;

const CREATE_PATIENTS: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name text NOT NULL,
    age integer NOT NULL,
    gender text NOT NULL,
    diagnosis text,
    created_by uuid NOT NULL
)
"#;

/// Ensures the portal schema exists.
///
/// # Errors
///
/// Returns a storage error if any DDL statement fails.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    for sql in [CREATE_PGCRYPTO, CREATE_USERS, CREATE_PATIENTS] {
        query(sql)
            .execute(pool)
            .await
            .map_err(|e| StorageError::internal(format!("schema bootstrap failed: {e}")))?;
    }
    debug!("schema bootstrap complete");
    Ok(())
}
