#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use finflow::db::Database;
use finflow::jwt::JwtConfig;
use finflow::{ServerConfig, create_app};
use tower::ServiceExt;

pub const ACCESS_SECRET: &[u8] = b"access-secret-used-only-in-tests-0001";
pub const REFRESH_SECRET: &[u8] = b"refresh-secret-used-only-in-tests-001";

/// Create a test app backed by an in-memory database.
/// The returned JwtConfig mirrors the app's signing configuration so tests
/// can craft their own tokens.
pub async fn create_test_app() -> (Router, Database, JwtConfig) {
    create_test_app_with(|_| {}).await
}

/// Create a test app with the default config adjusted by `customize`.
pub async fn create_test_app_with(
    customize: impl FnOnce(&mut ServerConfig),
) -> (Router, Database, JwtConfig) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");

    let mut config = ServerConfig {
        db: db.clone(),
        access_secret: ACCESS_SECRET.to_vec(),
        refresh_secret: REFRESH_SECRET.to_vec(),
        access_expire_minutes: 15,
        refresh_expire_hours: 72,
        cookie_domain: None,
        production: false,
        frontend_origin: None,
        external_verifier: None,
    };
    customize(&mut config);

    let jwt = JwtConfig::new(
        &config.access_secret,
        &config.refresh_secret,
        config.access_expire_minutes * 60,
        config.refresh_expire_hours * 60 * 60,
    );

    (create_app(&config), db, jwt)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_request_with_cookies(
    method: &str,
    uri: &str,
    cookies: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookies)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn request_with_cookies(method: &str, uri: &str, cookies: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookies)
        .body(Body::empty())
        .unwrap()
}

/// Extract Set-Cookie headers from a response.
pub fn extract_set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .collect()
}

/// Value of a named cookie among Set-Cookie headers. Cleared cookies
/// (empty value) don't count.
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    cookies.iter().find_map(|c| {
        let rest = c.strip_prefix(&format!("{}=", name))?;
        let value = rest.split(';').next().unwrap_or("");
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    })
}

/// Check if cookies contain a token being cleared (Max-Age=0)
pub fn has_cleared_cookie(cookies: &[String], cookie_name: &str) -> bool {
    cookies
        .iter()
        .any(|c| c.starts_with(&format!("{}=", cookie_name)) && c.contains("Max-Age=0"))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub fn session_cookies(access: &str, refresh: &str) -> String {
    format!("access_token={}; refresh_token={}", access, refresh)
}

/// Register a user through the API and return (access_token, refresh_token).
pub async fn register_session(
    app: &Router,
    name: &str,
    email: &str,
    password: &str,
) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            serde_json::json!({ "name": name, "email": email, "password": password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookies = extract_set_cookies(&response);
    let access = cookie_value(&cookies, "access_token").expect("No access token cookie");
    let refresh = cookie_value(&cookies, "refresh_token").expect("No refresh token cookie");
    (access, refresh)
}

/// Register a user and return a ready-to-send Cookie header.
pub async fn register_user(app: &Router, name: &str, email: &str, password: &str) -> String {
    let (access, refresh) = register_session(app, name, email, password).await;
    session_cookies(&access, &refresh)
}
