#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use base64::{engine::general_purpose, Engine as _};
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use routeguard::config::{extract_config, ConfigV1};
use routeguard::routes::create_router;
use routeguard::state::AppState;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_CONFIG: &str = r#"
version: "1.0.0"
bind_address: 127.0.0.1:8081
logging:
  level: "debug"
  format: "json"
jwt:
  exp: 3600
  iss: routeguard-test
  secret: test-secret
session:
  cookie_name: session_token
providers:
  - name: "Local accounts"
    type: "plain"
    users:
      - user_id: "1"
        username: ada
        password: lovelace
        email: ada@example.org
        roles: [user]
      - user_id: "2"
        username: grace
        password: hopper
        roles: [user, admin]
        tier: pro
      - user_id: "3"
        username: mallory
        password: nope
        status: disabled
      - user_id: "4"
        username: carol
        password: creator
        roles: [creator]
"#;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: i64,
    pub jti: String,
    pub username: String,
    pub roles: Vec<String>,
    pub status: String,
}

pub fn load_test_config() -> ConfigV1 {
    load_config_from(TEST_CONFIG)
}

pub fn load_config_from(yaml: &str) -> ConfigV1 {
    extract_config(&Figment::new().merge(Yaml::string(yaml)))
        .expect("Failed to parse test config YAML")
}

pub fn build_app() -> (Router, Arc<ConfigV1>) {
    build_app_from(TEST_CONFIG)
}

/// Build the router from a variant of the test config, e.g. to simulate an
/// operator editing the accounts while sessions are still out there.
pub fn build_app_from(yaml: &str) -> (Router, Arc<ConfigV1>) {
    let config = Arc::new(load_config_from(yaml));
    let state = AppState::from_config(&config);
    (create_router(state), config)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .expect("request should complete")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn get_with_bearer(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn get_with_cookie(path: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn login_json(username: &str, password: &str) -> Request<Body> {
    let body = serde_json::json!({ "username": username, "password": password }).to_string();
    Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("failed to build request")
}

pub fn login_basic(credentials: &str) -> Request<Body> {
    let encoded = general_purpose::STANDARD.encode(credentials);
    Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::AUTHORIZATION, format!("Basic {}", encoded))
        .body(Body::empty())
        .expect("failed to build request")
}

/// Log in and return the session token.
pub async fn login_token(app: &Router, username: &str, password: &str) -> String {
    let response = send(app, login_json(username, password)).await;
    assert_eq!(response.status(), 200, "login for {username} should succeed");
    body_json(response).await["token"]
        .as_str()
        .expect("token missing")
        .to_string()
}

pub fn decode_claims(token: &str, secret: &str) -> TokenData<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    decode(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )
    .expect("JWT should decode")
}
