#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use safewalk_api::auth::jwt::{generate_access_token, JwtConfig};
use safewalk_api::config::ServerConfig;
use safewalk_api::router::build_app_router;
use safewalk_api::state::AppState;
use safewalk_core::identity::{PROVIDER_EMAIL, PROVIDER_PHONE};
use safewalk_db::models::contact::{Contact, CreateContact};
use safewalk_db::models::user::{CreateUser, User};
use safewalk_db::repositories::{ContactRepo, UserRepo};
use sqlx::PgPool;
use tower::ServiceExt;

/// JWT settings shared by the test app and [`token_for`].
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: test_jwt_config(),
    }
}

/// Build the full application router, with the production middleware
/// stack, over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Issue a valid access token for `user_id`.
pub fn token_for(user_id: i64) -> String {
    generate_access_token(user_id, &test_jwt_config()).expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub async fn create_email_user(pool: &PgPool, name: &str, email: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: None,
            provider: PROVIDER_EMAIL.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_phone_user(pool: &PgPool, phone: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: None,
            email: None,
            phone: Some(phone.to_string()),
            provider: PROVIDER_PHONE.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

pub async fn create_contact(
    pool: &PgPool,
    owner_id: i64,
    phone: &str,
    email: Option<&str>,
    role: &str,
) -> Contact {
    ContactRepo::create(
        pool,
        owner_id,
        &CreateContact {
            name: format!("Contact {phone}"),
            phone: phone.to_string(),
            email: email.map(str::to_string),
            role: role.to_string(),
        },
    )
    .await
    .expect("contact creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn builder(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("Authorization", format!("Bearer {token}")),
        None => builder,
    }
}

/// Unauthenticated GET.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, builder(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        builder(Method::GET, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        builder(Method::POST, uri, None)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        builder(Method::POST, uri, Some(token))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

/// Authenticated POST without a body.
pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        builder(Method::POST, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        builder(Method::PUT, uri, Some(token))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        builder(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
