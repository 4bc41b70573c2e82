//! Process-wide signing key
//!
//! Built once at startup from `JWT_SECRET` and shared by reference between
//! the issuer and the verifier.

use crate::config::MIN_SECRET_LENGTH;
use crate::error::AuthError;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

/// HMAC key pair for signing and verifying tokens
pub struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Build the key from a shared secret
    ///
    /// A secret shorter than [`MIN_SECRET_LENGTH`] bytes is a configuration
    /// error; it is reported here, at startup, never per request.
    pub fn from_secret(secret: &[u8]) -> Result<Self, AuthError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthError::Config(format!(
                "signing secret must be at least {MIN_SECRET_LENGTH} bytes"
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub(crate) fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &Self::ALGORITHM)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            SigningKey::from_secret(b"too-short"),
            Err(AuthError::Config(_))
        ));
        assert!(SigningKey::from_secret(&[7u8; 32]).is_ok());
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = SigningKey::from_secret(b"super-secret-value-that-is-long-enough").unwrap();
        let rendered = format!("{key:?}");

        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("HS256"));
    }
}
