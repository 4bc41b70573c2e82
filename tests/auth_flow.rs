//! End-to-end flows through the router with in-memory stores

use authcore::store::{MemoryRevocationStore, MemoryUserStore};
use authcore::{create_routes, AuthConfig, AuthError, AuthService, LoginRequest, RegisterRequest};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
        access_token_expiration: 900,
        refresh_token_expiration: 604800,
        jwt_issuer: "authcore-test".to_string(),
        jwt_audience: "authcore-test-api".to_string(),
        argon2_memory_cost: 8,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        min_password_length: 8,
        store_timeout: Duration::from_secs(5),
    }
}

fn service() -> Arc<AuthService> {
    Arc::new(
        AuthService::new(
            &test_config(),
            Arc::new(MemoryUserStore::new()),
            Arc::new(MemoryRevocationStore::new()),
        )
        .unwrap(),
    )
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn register_login_scenario() {
    let auth = service();
    let app = create_routes(auth.clone());

    let (status, registered) = post_json(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "username": "alice", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(registered["user"]["email"], "a@x.com");
    assert!(registered["user"].get("password_hash").is_none());
    let access = registered["access_token"].as_str().unwrap();
    let user_id = registered["user"]["id"].as_str().unwrap().to_string();
    assert_eq!(auth.authenticate(access).unwrap().sub.to_string(), user_id);

    let (status, logged_in) = post_json(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let access = logged_in["access_token"].as_str().unwrap();
    assert_eq!(auth.authenticate(access).unwrap().sub.to_string(), user_id);

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same() {
    let auth = service();
    let app = create_routes(auth.clone());

    post_json(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "username": "alice", "password": "Passw0rd!" }),
    )
    .await;

    let wrong_password = post_json(
        &app,
        "/auth/login",
        json!({ "email": "a@x.com", "password": "Wr0ngPassword" }),
    )
    .await;
    let unknown_email = post_json(
        &app,
        "/auth/login",
        json!({ "email": "ghost@x.com", "password": "Passw0rd!" }),
    )
    .await;

    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn duplicate_email_conflicts_regardless_of_username() {
    let auth = service();
    let app = create_routes(auth);

    let (status, _) = post_json(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "username": "alice", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post_json(
        &app,
        "/auth/register",
        json!({ "email": "A@X.com", "username": "someone-else", "password": "Passw0rd!" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate_email");
}

#[tokio::test]
async fn refresh_then_logout() {
    let auth = service();
    let app = create_routes(auth.clone());

    let (_, registered) = post_json(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "username": "alice", "password": "Passw0rd!" }),
    )
    .await;
    let refresh = registered["refresh_token"].clone();

    let (status, rotated) =
        post_json(&app, "/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rotated["user"]["id"], registered["user"]["id"]);

    let (status, body) =
        post_json(&app, "/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token_revoked");

    let new_refresh = rotated["refresh_token"].clone();
    let (status, _) =
        post_json(&app, "/auth/logout", json!({ "refresh_token": new_refresh })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        post_json(&app, "/auth/refresh", json!({ "refresh_token": new_refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_with_issued_access_token() {
    let auth = service();
    let app = create_routes(auth);

    let (_, registered) = post_json(
        &app,
        "/auth/register",
        json!({ "email": "a@x.com", "username": "alice", "password": "Passw0rd!" }),
    )
    .await;
    let access = registered["access_token"].as_str().unwrap();

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {access}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["user_id"], registered["user"]["id"]);

    let refresh = registered["refresh_token"].as_str().unwrap();
    let req = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {refresh}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_registrations_of_one_email() {
    let auth = service();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let auth = auth.clone();
            tokio::spawn(async move {
                auth.register(RegisterRequest {
                    email: "race@x.com".into(),
                    username: format!("racer{i}"),
                    password: "Passw0rd!".into(),
                })
                .await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert_eq!(err, AuthError::DuplicateEmail),
        }
    }
    assert_eq!(created, 1);

    let login = auth
        .login(LoginRequest {
            email: "race@x.com".into(),
            password: "Passw0rd!".into(),
        })
        .await;
    assert!(login.is_ok());
}
