//! Authentication HTTP Handlers
//!
//! REST endpoints that marshal requests into [`AuthApi`] calls and map the
//! results onto status codes. No authentication logic lives here.

use crate::error::AuthError;
use crate::extractors::BearerToken;
use crate::models::*;
use crate::service::AuthApi;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Shared auth service state
pub type AuthState = Arc<dyn AuthApi>;

// ============================================
// Route Builder
// ============================================

/// Create authentication routes
pub fn create_routes(auth: AuthState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_current_user))
        .with_state(auth)
}

/// POST /auth/register
///
/// Register a new user account; answers 201 with a token pair
pub async fn register(
    State(auth): State<AuthState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.register(req).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
///
/// Authenticate user and return access/refresh tokens
pub async fn login(
    State(auth): State<AuthState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.login(req).await?;

    Ok(Json(response))
}

/// POST /auth/refresh
pub async fn refresh_token(
    State(auth): State<AuthState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let response = auth.refresh(req).await?;

    Ok(Json(response))
}

/// POST /auth/logout
pub async fn logout(
    State(auth): State<AuthState>,
    Json(req): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    auth.logout(req).await?;

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// GET /auth/me
///
/// Identity carried by the presented access token
pub async fn get_current_user(
    State(auth): State<AuthState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, AuthError> {
    let claims = auth.authenticate(&token).await?;

    Ok(Json(serde_json::json!({
        "user_id": claims.sub,
        "issued_at": claims.iat,
        "expires_at": claims.exp
    })))
}
