//! Token Issuer
//!
//! Mints signed access/refresh pairs. Both halves are HS256 JWTs with their
//! own `jti` and `typ`, so neither can be turned into the other without the
//! signing secret.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keys::SigningKey;
use crate::models::{Claims, TokenKind, TokenPair};

use chrono::Utc;
use jsonwebtoken::{encode, Header};
use std::sync::Arc;
use uuid::Uuid;

pub struct TokenIssuer {
    key: Arc<SigningKey>,
    issuer: String,
    audience: String,
    access_ttl: i64,
    refresh_ttl: i64,
}

impl TokenIssuer {
    pub fn new(key: Arc<SigningKey>, config: &AuthConfig) -> Self {
        Self {
            key,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_ttl: config.access_token_expiration,
            refresh_ttl: config.refresh_token_expiration,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_ttl(&self) -> i64 {
        self.access_ttl
    }

    pub fn claims_at(&self, user_id: Uuid, kind: TokenKind, now: i64) -> Claims {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        Claims {
            sub: user_id,
            iat: now,
            exp: now + ttl,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: Uuid::new_v4(),
            typ: kind,
        }
    }

    /// Sign arbitrary claims with the process key
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        let token = encode(&Header::new(SigningKey::ALGORITHM), claims, self.key.encoding())?;
        Ok(token)
    }

    pub fn issue_token_pair(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        self.issue_token_pair_at(user_id, Utc::now().timestamp())
    }

    /// Issue a pair as if the current time were `now` (unix seconds)
    pub fn issue_token_pair_at(&self, user_id: Uuid, now: i64) -> Result<TokenPair, AuthError> {
        let access = self.claims_at(user_id, TokenKind::Access, now);
        let refresh = self.claims_at(user_id, TokenKind::Refresh, now);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
        })
    }
}
