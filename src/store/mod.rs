//! Persistence seams
//!
//! The service only talks to storage through [`UserStore`] and
//! [`RevocationStore`]. `memory` backs tests and single-process
//! deployments; `postgres` is the durable implementation.

pub mod memory;
pub mod postgres;

pub use memory::{MemoryRevocationStore, MemoryUserStore};
pub use postgres::{migrate, PgRevocationStore, PgUserStore};

use crate::error::AuthError;
use crate::models::{NewUser, User};

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

/// User persistence
///
/// `insert` must check email and username uniqueness and write the row as
/// one atomic step, reporting `DuplicateEmail` before `DuplicateUsername`
/// when both collide.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, AuthError>;

    /// Lookup by the already lower-cased email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError>;
}

/// Revoked refresh-token ids
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `jti` as revoked until `expires_at` (unix seconds).
    ///
    /// Returns `true` only for the call that actually inserted the entry.
    /// Concurrent revocations of one `jti` must see exactly one `true`.
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, AuthError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AuthError>;
}

/// Run a store call under `limit`; elapsing maps to `StoreUnavailable`.
pub async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(AuthError::StoreUnavailable("operation timed out".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_result_through() {
        let value = bounded(Duration::from_secs(1), async { Ok::<_, AuthError>(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result = bounded(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AuthError>(())
        })
        .await;

        assert!(matches!(result, Err(AuthError::StoreUnavailable(_))));
    }
}
