//! PostgreSQL stores

use super::{RevocationStore, UserStore};
use crate::error::AuthError;
use crate::models::{NewUser, User};

use async_trait::async_trait;
use chrono::DateTime;
use sqlx::PgPool;
use uuid::Uuid;

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Create the authentication tables if they do not exist
pub async fn migrate(db: &PgPool) -> Result<(), AuthError> {
    tracing::info!("Running authentication database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email VARCHAR(255) NOT NULL,
            username VARCHAR(50) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT users_email_key UNIQUE (email),
            CONSTRAINT users_username_key UNIQUE (username)
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS revoked_tokens (
            jti UUID PRIMARY KEY,
            expires_at TIMESTAMPTZ NOT NULL,
            revoked_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_revoked_tokens_expires ON revoked_tokens(expires_at);",
    )
    .execute(db)
    .await?;

    tracing::info!("Authentication migrations completed successfully");
    Ok(())
}

/// Map a unique-constraint violation to the matching duplicate error
fn map_insert_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => AuthError::DuplicateUsername,
                _ => AuthError::DuplicateEmail,
            };
        }
    }
    AuthError::from(err)
}

/// User store backed by the `users` table
///
/// Uniqueness is enforced by the table constraints, so concurrent inserts
/// of the same email or username cannot both succeed.
#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, username, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, username, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as(
            "SELECT id, email, username, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as(
            "SELECT id, email, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

/// Revocation list backed by the `revoked_tokens` table
#[derive(Clone)]
pub struct PgRevocationStore {
    db: PgPool,
}

impl PgRevocationStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Delete rows whose tokens have expired on their own
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, AuthError> {
        let expires_at = DateTime::from_timestamp(expires_at, 0).ok_or(AuthError::Internal)?;

        // the primary key decides between racing revocations
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, expires_at)
            VALUES ($1, $2)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AuthError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.db)
                .await?;
        Ok(revoked)
    }
}
