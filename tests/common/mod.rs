#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use picfeed::config::{Config, OAuthProviderConfig};
use picfeed::state::SharedState;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_config() -> Config {
    let mut config = Config::default();
    let path = std::env::temp_dir().join(format!("picfeed-api-{}.db", uuid::Uuid::new_v4()));
    config.general.database_path = format!("sqlite:{}?mode=rwc", path.display());

    config.server.secure_cookies = false;

    config.storage.access_key_id = Some("test-access-key".to_string());
    config.storage.secret_access_key = Some("test-secret-key".to_string());
    config.storage.endpoint = Some("http://127.0.0.1:9000".to_string());
    config.storage.force_path_style = true;

    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config.security.argon2_parallelism = 1;

    config.oauth.push(OAuthProviderConfig {
        name: "testhub".to_string(),
        client_id: "picfeed-client".to_string(),
        client_secret: "picfeed-secret".to_string(),
        authorize_url: "https://auth.testhub.example/authorize".to_string(),
        token_url: "https://auth.testhub.example/token".to_string(),
        userinfo_url: "https://api.testhub.example/user".to_string(),
        scopes: vec!["openid".to_string(), "email".to_string()],
    });

    config
}

pub async fn spawn_app() -> Router {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: Config) -> Router {
    let shared = Arc::new(
        SharedState::new(config)
            .await
            .expect("Failed to create shared state"),
    );
    let state = picfeed::api::create_app_state(shared, None);
    picfeed::api::router(state)
        .await
        .expect("Failed to build router")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
    pub location: Option<String>,
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        body,
        cookie,
        location,
    }
}

/// Registered user with a live session cookie.
pub struct TestUser {
    pub id: i64,
    pub username: String,
    pub cookie: String,
}

pub async fn register(app: &Router, name: &str, email: &str) -> TestUser {
    let response = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "correct-horse" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);

    TestUser {
        id: response.body["data"]["id"].as_i64().unwrap(),
        username: response.body["data"]["username"]
            .as_str()
            .unwrap()
            .to_string(),
        cookie: response.cookie.expect("register sets a session cookie"),
    }
}

pub async fn create_post(app: &Router, user: &TestUser, caption: &str) -> i64 {
    let response = send(
        app,
        "POST",
        "/api/posts",
        Some(&user.cookie),
        Some(json!({
            "caption": caption,
            "image_key": format!("posts/{}/{}.jpg", user.id, uuid::Uuid::new_v4()),
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    response.body["data"]["id"].as_i64().unwrap()
}
