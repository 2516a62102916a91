//! User account storage.

use async_trait::async_trait;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;
use uuid::Uuid;

use clinic_storage::{AccountStore, NewUser, Role, StorageError, User};

type UserTuple = (Uuid, String, String, String, String);

fn user_from_tuple(row: UserTuple) -> Result<User, StorageError> {
    let role: Role = row
        .4
        .parse()
        .map_err(|e: String| StorageError::internal(format!("corrupt role column: {e}")))?;
    Ok(User {
        id: row.0,
        name: row.1,
        email: row.2,
        password_hash: row.3,
        role,
    })
}

/// PostgreSQL implementation of [`AccountStore`].
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Creates a new account store over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let row: UserTuple = query_as(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to create user: {e}")))?;

        user_from_tuple(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserTuple> = query_as(
            r#"
            SELECT id, name, email, password_hash, role
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::internal(format!("failed to look up user: {e}")))?;

        row.map(user_from_tuple).transpose()
    }
}
