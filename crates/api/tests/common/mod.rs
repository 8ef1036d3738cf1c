#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use trailhead_api::auth::jwt::{generate_access_token, JwtConfig};
use trailhead_api::config::ServerConfig;
use trailhead_api::router::build_app_router;
use trailhead_api::state::AppState;
use trailhead_core::roles::ROLE_LEADER;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and a fixed signing secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the production router over `pool` with [`test_config`].
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(test_config()),
    })
}

/// Mint a bearer token for `role` signed with the test secret.
pub fn token_for(role: &str) -> String {
    generate_access_token(1, role, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with an optional JSON body and bearer token.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// GET as a leader.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, Some(&token_for(ROLE_LEADER))).await
}

/// POST a JSON body as a leader.
pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), Some(&token_for(ROLE_LEADER))).await
}

/// PUT a JSON body as a leader.
pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body), Some(&token_for(ROLE_LEADER))).await
}

/// PATCH without a body as a leader.
pub async fn patch(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::PATCH, uri, None, Some(&token_for(ROLE_LEADER))).await
}

/// DELETE as a leader.
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, Some(&token_for(ROLE_LEADER))).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create an outing through the API and return its id.
pub async fn create_outing(pool: &PgPool, name: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/outings",
        serde_json::json!({ "name": name, "location": "Camp Yawgoog" }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Sign a participant up through the API and return their id.
pub async fn add_participant(pool: &PgPool, outing_id: i64, body: Value) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/outings/{outing_id}/participants"),
        body,
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Sign up a non-adult scout.
pub async fn add_scout(pool: &PgPool, outing_id: i64, name: &str, age: i32, gender: &str) -> i64 {
    add_participant(
        pool,
        outing_id,
        serde_json::json!({
            "name": name,
            "age": age,
            "gender": gender,
            "is_adult": false,
        }),
    )
    .await
}

/// Sign up an adult leader.
pub async fn add_adult(pool: &PgPool, outing_id: i64, name: &str) -> i64 {
    add_participant(
        pool,
        outing_id,
        serde_json::json!({ "name": name, "age": 45, "gender": "male", "is_adult": true }),
    )
    .await
}
