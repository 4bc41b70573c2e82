//! Credential Store
//!
//! Input validation, password hashing and credential checks in front of a
//! [`UserStore`]. Plaintext passwords never leave this module.

use crate::error::AuthError;
use crate::models::{NewUser, User};
use crate::password::PasswordHashing;
use crate::store::{bounded, UserStore};

use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use validator::Validate;

#[derive(Validate)]
struct Identity {
    #[validate(email(message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 1, max = 50, message = "Username must be 1-50 characters"))]
    username: String,
}

/// Lower-case and trim an email so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct CredentialStore {
    users: Arc<dyn UserStore>,
    hashing: PasswordHashing,
    timeout: Duration,
    /// Verified when the email is unknown so both failure paths do the same work
    dummy_hash: String,
}

impl CredentialStore {
    pub fn new(
        users: Arc<dyn UserStore>,
        hashing: PasswordHashing,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hashing.hash(&Uuid::new_v4().to_string())?;

        Ok(Self {
            users,
            hashing,
            timeout,
            dummy_hash,
        })
    }

    /// Validate, hash and persist a new user
    pub async fn create_user(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let identity = Identity {
            email: normalize_email(email),
            username: username.trim().to_string(),
        };
        identity.validate()?;

        if identity.username.chars().any(char::is_whitespace) {
            return Err(AuthError::InvalidInput(
                "Username must not contain whitespace".to_string(),
            ));
        }

        self.hashing.check_policy(password)?;
        let password_hash = self.hashing.hash_blocking(password).await?;

        let user = bounded(
            self.timeout,
            self.users.insert(NewUser {
                email: identity.email,
                username: identity.username,
                password_hash,
            }),
        )
        .await?;

        Ok(user)
    }

    /// Check an email/password pair
    ///
    /// Fails with `UserNotFound` or `InvalidPassword`; callers facing the
    /// outside world should collapse both with [`AuthError::into_public`].
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);
        let user = bounded(self.timeout, self.users.find_by_email(&email)).await?;

        let Some(user) = user else {
            self.hashing.verify_blocking(password, &self.dummy_hash).await?;
            return Err(AuthError::UserNotFound);
        };

        if !self
            .hashing
            .verify_blocking(password, &user.password_hash)
            .await?
        {
            return Err(AuthError::InvalidPassword);
        }

        Ok(user)
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        bounded(self.timeout, self.users.find_by_id(id)).await
    }
}
