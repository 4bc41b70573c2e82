//! Authentication Extractors
//!
//! Axum extractors for bearer credentials.

use crate::error::AuthError;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Raw token from an `Authorization: Bearer <token>` header
///
/// Only the header shape is checked here; the token itself is verified by
/// the service.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Malformed)?;

        Ok(BearerToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<BearerToken, AuthError> {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_bearer_token_extracted() {
        let token = extract(Some("Bearer abc.def.ghi")).await.unwrap();
        assert_eq!(token.0, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_missing_header() {
        assert_eq!(extract(None).await.unwrap_err(), AuthError::MissingToken);
    }

    #[tokio::test]
    async fn test_wrong_scheme() {
        assert_eq!(
            extract(Some("Basic dXNlcjpwYXNz")).await.unwrap_err(),
            AuthError::Malformed
        );
        assert_eq!(
            extract(Some("Bearer ")).await.unwrap_err(),
            AuthError::Malformed
        );
    }
}
