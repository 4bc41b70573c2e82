//! In-memory stores

use super::{RevocationStore, UserStore};
use crate::error::AuthError;
use crate::models::{NewUser, User};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Users {
    by_id: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
    username_index: HashMap<String, Uuid>,
}

/// User store held in process memory
///
/// Uniqueness checks and the insert happen under one write lock.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Users>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        if users.email_index.contains_key(&user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        if users.username_index.contains_key(&user.username) {
            return Err(AuthError::DuplicateUsername);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };

        users.email_index.insert(user.email.clone(), user.id);
        users.username_index.insert(user.username.clone(), user.id);
        users.by_id.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;
        Ok(users
            .email_index
            .get(email)
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }
}

/// Revocation list held in process memory
///
/// Entries are dropped once the token they refer to would have expired
/// anyway.
#[derive(Default)]
pub struct MemoryRevocationStore {
    revoked: RwLock<HashMap<Uuid, i64>>,
}

impl MemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: Uuid, expires_at: i64) -> Result<bool, AuthError> {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;

        revoked.retain(|_, exp| *exp >= now);

        Ok(revoked.insert(jti, expires_at).is_none())
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AuthError> {
        Ok(self.revoked.read().await.contains_key(&jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str, username: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = MemoryUserStore::new();
        assert!(store.is_empty().await);
        let user = store.insert(new_user("a@x.com", "alice")).await.unwrap();
        assert!(!store.is_empty().await);

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();

        assert_eq!(by_email.id, user.id);
        assert_eq!(by_id.username, "alice");
        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_rejected() {
        let store = MemoryUserStore::new();
        store.insert(new_user("a@x.com", "alice")).await.unwrap();

        assert_eq!(
            store.insert(new_user("a@x.com", "bob")).await.unwrap_err(),
            AuthError::DuplicateEmail
        );
        assert_eq!(
            store.insert(new_user("b@x.com", "alice")).await.unwrap_err(),
            AuthError::DuplicateUsername
        );
        // email wins when both collide
        assert_eq!(
            store.insert(new_user("a@x.com", "alice")).await.unwrap_err(),
            AuthError::DuplicateEmail
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_inserts_create_one_user() {
        let store = Arc::new(MemoryUserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .insert(new_user("race@x.com", &format!("user{i}")))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err, AuthError::DuplicateEmail),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_revocation_prunes_expired_entries() {
        let store = MemoryRevocationStore::new();
        let now = Utc::now().timestamp();
        let stale = Uuid::new_v4();
        let live = Uuid::new_v4();

        assert!(store.is_empty().await);
        store.revoke(stale, now - 10).await.unwrap();
        store.revoke(live, now + 3600).await.unwrap();

        assert!(!store.is_revoked(stale).await.unwrap());
        assert!(store.is_revoked(live).await.unwrap());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_revoke_reports_first_insert_only() {
        let store = MemoryRevocationStore::new();
        let jti = Uuid::new_v4();
        let exp = Utc::now().timestamp() + 3600;

        assert!(store.revoke(jti, exp).await.unwrap());
        assert!(!store.revoke(jti, exp).await.unwrap());
        assert!(store.is_revoked(jti).await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_revokes_have_one_winner() {
        let store = Arc::new(MemoryRevocationStore::new());
        let jti = Uuid::new_v4();
        let exp = Utc::now().timestamp() + 3600;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.revoke(jti, exp).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
