//! Token Verifier
//!
//! Pure checks over a token and the signing key: signature, issuer,
//! audience, structure and expiry against a caller-supplied clock. No I/O;
//! revocation is the service's concern.

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::keys::SigningKey;
use crate::models::{Claims, TokenKind};

use jsonwebtoken::{decode, Validation};
use std::sync::Arc;

pub struct TokenVerifier {
    key: Arc<SigningKey>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(key: Arc<SigningKey>, config: &AuthConfig) -> Self {
        let mut validation = Validation::new(SigningKey::ALGORITHM);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        // expiry is checked against the caller's clock in `verify`
        validation.validate_exp = false;
        validation.leeway = 0;

        Self { key, validation }
    }

    /// Decode and check a token at time `now` (unix seconds)
    ///
    /// A token stays valid through its `exp` second and is `Expired` after.
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, self.key.decoding(), &self.validation)?;
        let claims = data.claims;

        if claims.exp < now {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    /// [`verify`](Self::verify) plus a check that the token is an access token
    pub fn verify_access(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.verify_kind(token, TokenKind::Access, now)
    }

    /// [`verify`](Self::verify) plus a check that the token is a refresh token
    pub fn verify_refresh(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        self.verify_kind(token, TokenKind::Refresh, now)
    }

    fn verify_kind(&self, token: &str, kind: TokenKind, now: i64) -> Result<Claims, AuthError> {
        let claims = self.verify(token, now)?;
        if claims.typ != kind {
            tracing::debug!(expected = ?kind, actual = ?claims.typ, "Token kind mismatch");
            return Err(AuthError::Malformed);
        }
        Ok(claims)
    }
}
