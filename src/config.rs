//! Authentication Configuration
//!
//! All configuration values are loaded from environment variables.
//! No hardcoded secrets or sensitive data.

use crate::error::AuthError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Minimum accepted length of the JWT signing secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Authentication configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT secret key for signing tokens (from JWT_SECRET env var)
    pub jwt_secret: String,

    /// JWT access token expiration in seconds (from JWT_ACCESS_EXPIRATION env var)
    pub access_token_expiration: i64,

    /// JWT refresh token expiration in seconds (from JWT_REFRESH_EXPIRATION env var)
    pub refresh_token_expiration: i64,

    /// JWT issuer (from JWT_ISSUER env var)
    pub jwt_issuer: String,

    /// JWT audience (from JWT_AUDIENCE env var)
    pub jwt_audience: String,

    /// Argon2 memory cost in KiB (from ARGON2_MEMORY_COST env var)
    pub argon2_memory_cost: u32,

    /// Argon2 time cost (iterations) (from ARGON2_TIME_COST env var)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (from ARGON2_PARALLELISM env var)
    pub argon2_parallelism: u32,

    /// Minimum password length (from MIN_PASSWORD_LENGTH env var)
    pub min_password_length: usize,

    /// Upper bound on a single store call (from STORE_TIMEOUT_MS env var)
    pub store_timeout: Duration,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AuthConfig {
    /// Load configuration from environment variables
    ///
    /// Fails with [`AuthError::Config`] when `JWT_SECRET` is not set.
    pub fn from_env() -> Result<Self, AuthError> {
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| {
            AuthError::Config("JWT_SECRET environment variable must be set".to_string())
        })?;

        Ok(Self {
            jwt_secret,
            access_token_expiration: env_or("JWT_ACCESS_EXPIRATION", 900), // 15 minutes
            refresh_token_expiration: env_or("JWT_REFRESH_EXPIRATION", 604800), // 7 days
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "authcore".to_string()),
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authcore-api".to_string()),
            argon2_memory_cost: env_or("ARGON2_MEMORY_COST", 65536), // 64 MiB
            argon2_time_cost: env_or("ARGON2_TIME_COST", 3),
            argon2_parallelism: env_or("ARGON2_PARALLELISM", 4),
            min_password_length: env_or("MIN_PASSWORD_LENGTH", 8),
            store_timeout: Duration::from_millis(env_or("STORE_TIMEOUT_MS", 5000)),
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "JWT_SECRET must be at least {MIN_SECRET_LENGTH} characters"
            )));
        }

        if self.access_token_expiration <= 0 {
            return Err(AuthError::Config(
                "JWT_ACCESS_EXPIRATION must be positive".to_string(),
            ));
        }

        if self.refresh_token_expiration <= self.access_token_expiration {
            return Err(AuthError::Config(
                "JWT_REFRESH_EXPIRATION must be greater than JWT_ACCESS_EXPIRATION".to_string(),
            ));
        }

        if self.min_password_length < 8 {
            return Err(AuthError::Config(
                "MIN_PASSWORD_LENGTH must be at least 8".to_string(),
            ));
        }

        if self.store_timeout.is_zero() {
            return Err(AuthError::Config(
                "STORE_TIMEOUT_MS must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "a".repeat(32),
        access_token_expiration: 900,
        refresh_token_expiration: 604800,
        jwt_issuer: "test".to_string(),
        jwt_audience: "test-api".to_string(),
        // Cheap parameters keep hashing fast in tests
        argon2_memory_cost: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
        store_timeout: Duration::from_secs(5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_secret() {
        let config = AuthConfig {
            jwt_secret: "short".to_string(),
            ..test_config()
        };

        assert!(matches!(config.validate(), Err(AuthError::Config(_))));
    }

    #[test]
    fn test_config_validation_refresh_not_longer_than_access() {
        let config = AuthConfig {
            access_token_expiration: 900,
            refresh_token_expiration: 900,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_weak_password_policy() {
        let config = AuthConfig {
            min_password_length: 6,
            ..test_config()
        };

        assert!(config.validate().is_err());
    }
}
