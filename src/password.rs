//! Password hashing and policy
//!
//! Argon2id with parameters taken from [`AuthConfig`]. Hashes are stored as
//! PHC strings, so verification reads the parameters back out of the hash
//! and keeps working after the configured cost changes.

use crate::config::AuthConfig;
use crate::error::AuthError;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id hasher plus the minimum-length policy
#[derive(Debug, Clone)]
pub struct PasswordHashing {
    params: Params,
    min_length: usize,
}

impl PasswordHashing {
    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
            None,
        )
        .map_err(|e| AuthError::Config(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            params,
            min_length: config.min_password_length,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)?
            .to_string();

        Ok(hash)
    }

    /// Verify a password against a stored hash
    ///
    /// The digest comparison inside argon2 is constant-time.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash = PasswordHash::new(hash)?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// [`hash`](Self::hash) on the blocking pool, off the async workers
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hashing = self.clone();
        let password = password.to_owned();
        blocking(move || hashing.hash(&password)).await
    }

    /// [`verify`](Self::verify) on the blocking pool, off the async workers
    pub async fn verify_blocking(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let hashing = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        blocking(move || hashing.verify(&password, &hash)).await
    }

    /// Validate password strength
    pub fn check_policy(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.min_length {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {} characters",
                self.min_length
            )));
        }

        Ok(())
    }
}

/// Run CPU-bound work on tokio's blocking pool
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        tracing::error!("Blocking task failed: {:?}", e);
        AuthError::Internal
    })?
}
