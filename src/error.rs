//! Authentication Error Types
//!
//! Centralized error handling for all authentication operations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Username already taken")]
    DuplicateUsername,

    /// Internal to the credential store; the service reports `InvalidCredentials`.
    #[error("User not found")]
    UserNotFound,

    /// Internal to the credential store; the service reports `InvalidCredentials`.
    #[error("Invalid password")]
    InvalidPassword,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    Expired,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Authentication required")]
    MissingToken,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error")]
    Internal,
}

impl AuthError {
    /// Stable machine-readable code for response bodies and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "invalid_input",
            AuthError::DuplicateEmail => "duplicate_email",
            AuthError::DuplicateUsername => "duplicate_username",
            AuthError::UserNotFound => "user_not_found",
            AuthError::InvalidPassword => "invalid_password",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Expired => "token_expired",
            AuthError::Malformed => "token_malformed",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::Revoked => "token_revoked",
            AuthError::MissingToken => "missing_token",
            AuthError::StoreUnavailable(_) => "store_unavailable",
            AuthError::Config(_) => "configuration_error",
            AuthError::Internal => "internal_error",
        }
    }

    /// Whether a caller may retry the same request later
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::StoreUnavailable(_))
    }

    /// Collapse credential-store lookup failures so callers cannot tell
    /// an unknown account from a wrong password.
    pub fn into_public(self) -> Self {
        match self {
            AuthError::UserNotFound | AuthError::InvalidPassword => AuthError::InvalidCredentials,
            other => other,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if self.is_transient() {
            tracing::warn!(error = %self, "Transient failure returned to client");
        }

        let (status, message) = match &self {
            AuthError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::DuplicateEmail | AuthError::DuplicateUsername => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AuthError::UserNotFound
            | AuthError::InvalidPassword
            | AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials.to_string(),
            ),
            AuthError::Expired
            | AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Revoked
            | AuthError::MissingToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::StoreUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable".to_string(),
            ),
            AuthError::Config(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal error occurred".to_string(),
            ),
        };

        let code = match &self {
            AuthError::UserNotFound | AuthError::InvalidPassword => {
                AuthError::InvalidCredentials.kind()
            }
            other => other.kind(),
        };

        (
            status,
            Json(serde_json::json!({
                "error": code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AuthError::StoreUnavailable(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        tracing::debug!("JWT error: {:?}", err);
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience => AuthError::InvalidSignature,
            _ => AuthError::Malformed,
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(err: validator::ValidationErrors) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}
