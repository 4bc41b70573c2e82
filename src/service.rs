//! Authentication Service
//!
//! Orchestrates registration, login and the token lifecycle on top of the
//! credential store, the token issuer/verifier and the revocation list.

use crate::config::AuthConfig;
use crate::credentials::{normalize_email, CredentialStore};
use crate::error::AuthError;
use crate::issuer::TokenIssuer;
use crate::keys::SigningKey;
use crate::models::*;
use crate::password::PasswordHashing;
use crate::store::{bounded, RevocationStore, UserStore};
use crate::verifier::TokenVerifier;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Call contract consumed by the HTTP layer
///
/// [`AuthService`] is the production implementation; handlers only see
/// this trait, so tests can put a double behind them.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError>;

    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError>;

    async fn refresh(&self, req: RefreshTokenRequest) -> Result<AuthResponse, AuthError>;

    async fn logout(&self, req: RefreshTokenRequest) -> Result<(), AuthError>;

    /// Check an access token at the current time
    async fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError>;
}

/// Authentication service
pub struct AuthService {
    credentials: CredentialStore,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    revocations: Arc<dyn RevocationStore>,
    store_timeout: Duration,
}

impl AuthService {
    /// Build the service and its components from configuration
    ///
    /// The signing key is derived once here and shared by the issuer and
    /// the verifier. Any configuration problem is returned before the
    /// service exists.
    ///
    /// # Examples
    /// ```
    /// use authcore::{AuthConfig, AuthService, RegisterRequest};
    /// use authcore::store::{MemoryRevocationStore, MemoryUserStore};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let config = AuthConfig {
    ///     jwt_secret: "x".repeat(32),
    ///     access_token_expiration: 900,
    ///     refresh_token_expiration: 604800,
    ///     jwt_issuer: "doc".into(),
    ///     jwt_audience: "doc-api".into(),
    ///     argon2_memory_cost: 8,
    ///     argon2_time_cost: 1,
    ///     argon2_parallelism: 1,
    ///     min_password_length: 8,
    ///     store_timeout: Duration::from_secs(5),
    /// };
    /// let svc = AuthService::new(
    ///     &config,
    ///     Arc::new(MemoryUserStore::new()),
    ///     Arc::new(MemoryRevocationStore::new()),
    /// )
    /// .unwrap();
    /// let req = RegisterRequest {
    ///     email: "a@x.com".into(),
    ///     username: "alice".into(),
    ///     password: "Passw0rd!".into(),
    /// };
    /// let response = tokio_test::block_on(svc.register(req)).unwrap();
    /// assert_eq!(response.user.email, "a@x.com");
    /// ```
    pub fn new(
        config: &AuthConfig,
        users: Arc<dyn UserStore>,
        revocations: Arc<dyn RevocationStore>,
    ) -> Result<Self, AuthError> {
        config.validate()?;

        let key = Arc::new(SigningKey::from_secret(config.jwt_secret.as_bytes())?);
        let hashing = PasswordHashing::from_config(config)?;

        Ok(Self {
            credentials: CredentialStore::new(users, hashing, config.store_timeout)?,
            issuer: TokenIssuer::new(key.clone(), config),
            verifier: TokenVerifier::new(key, config),
            revocations,
            store_timeout: config.store_timeout,
        })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    fn respond(&self, tokens: TokenPair, user: &User) -> AuthResponse {
        AuthResponse::new(tokens, UserResponse::from(user), self.issuer.access_ttl())
    }

    // ============================================
    // Registration / Login
    // ============================================

    /// Register a new user and issue their first token pair
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn register(&self, mut req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        req.email = normalize_email(&req.email);
        req.validate()?;

        let user = self
            .credentials
            .create_user(&req.email, &req.username, &req.password)
            .await?;
        let tokens = self.issuer.issue_token_pair(user.id)?;

        info!(user_id = %user.id, "User registered");
        Ok(self.respond(tokens, &user))
    }

    /// Check credentials and issue a token pair
    ///
    /// Unknown email and wrong password both surface as
    /// `InvalidCredentials`.
    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, mut req: LoginRequest) -> Result<AuthResponse, AuthError> {
        req.email = normalize_email(&req.email);
        req.validate()?;

        let user = match self
            .credentials
            .verify_credentials(&req.email, &req.password)
            .await
        {
            Ok(user) => user,
            Err(err) => {
                if matches!(err, AuthError::UserNotFound | AuthError::InvalidPassword) {
                    warn!("Failed login attempt");
                }
                return Err(err.into_public());
            }
        };

        let tokens = self.issuer.issue_token_pair(user.id)?;

        info!(user_id = %user.id, "User logged in");
        Ok(self.respond(tokens, &user))
    }

    // ============================================
    // Token Lifecycle
    // ============================================

    /// Verify a refresh token and make sure it has not been revoked
    async fn check_refresh_token(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let claims = self.verifier.verify_refresh(token, now)?;

        if bounded(self.store_timeout, self.revocations.is_revoked(claims.jti)).await? {
            warn!(user_id = %claims.sub, jti = %claims.jti, "Revoked refresh token presented");
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Exchange a refresh token for a new pair, revoking the old one
    ///
    /// The revocation insert is what redeems the token: of two concurrent
    /// refreshes with one token, only the caller whose insert lands gets a
    /// new pair.
    #[instrument(skip(self, req))]
    pub async fn refresh(&self, req: RefreshTokenRequest) -> Result<AuthResponse, AuthError> {
        req.validate()?;
        let now = Utc::now().timestamp();

        let claims = self.check_refresh_token(&req.refresh_token, now).await?;

        let user = self
            .credentials
            .find_user(claims.sub)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let redeemed = bounded(
            self.store_timeout,
            self.revocations.revoke(claims.jti, claims.exp),
        )
        .await?;
        if !redeemed {
            warn!(user_id = %claims.sub, jti = %claims.jti, "Revoked refresh token presented");
            return Err(AuthError::Revoked);
        }

        let tokens = self.issuer.issue_token_pair_at(user.id, now)?;

        info!(user_id = %user.id, "Tokens refreshed");
        Ok(self.respond(tokens, &user))
    }

    /// Revoke a refresh token
    ///
    /// Logging out twice with the same token is not an error.
    #[instrument(skip(self, req))]
    pub async fn logout(&self, req: RefreshTokenRequest) -> Result<(), AuthError> {
        req.validate()?;

        let claims = self
            .verifier
            .verify_refresh(&req.refresh_token, Utc::now().timestamp())?;

        bounded(
            self.store_timeout,
            self.revocations.revoke(claims.jti, claims.exp),
        )
        .await?;

        info!(user_id = %claims.sub, "User logged out");
        Ok(())
    }

    pub fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        self.verifier
            .verify_access(access_token, Utc::now().timestamp())
    }
}

#[async_trait]
impl AuthApi for AuthService {
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AuthError> {
        AuthService::register(self, req).await
    }

    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        AuthService::login(self, req).await
    }

    async fn refresh(&self, req: RefreshTokenRequest) -> Result<AuthResponse, AuthError> {
        AuthService::refresh(self, req).await
    }

    async fn logout(&self, req: RefreshTokenRequest) -> Result<(), AuthError> {
        AuthService::logout(self, req).await
    }

    async fn authenticate(&self, access_token: &str) -> Result<Claims, AuthError> {
        AuthService::authenticate(self, access_token)
    }
}
