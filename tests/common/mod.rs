//! Shared helpers for driving the router through `tower::ServiceExt`.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use encore::api::AppState;
use encore::db::Store;
use encore::services::UploadService;

/// Seeded by the initial migration.
pub const MANAGER_EMAIL: &str = "manager@example.com";
pub const MANAGER_PASSWORD: &str = "change-me";

pub async fn spawn_app() -> (Arc<AppState>, Router) {
    let scratch = std::env::temp_dir().join(format!("encore-test-{}", uuid::Uuid::new_v4()));

    let mut config = encore::Config::default();
    config.database.url = format!("sqlite:{}", scratch.join("encore.db").display());
    config.uploads.root = scratch.join("uploads").to_string_lossy().to_string();

    let store = Store::new(&config.database.url)
        .await
        .expect("failed to open test database");
    let uploads = UploadService::new(&config.uploads.root);
    uploads
        .ensure_directories()
        .await
        .expect("failed to prepare upload dirs");

    let state = encore::api::create_app_state(config, store, uploads);
    let router = encore::api::router(state.clone());
    (state, router)
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn form_body(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub const BOUNDARY: &str = "encore-test-boundary";

/// Builds a multipart/form-data body with text fields and an optional file
/// part.
pub fn multipart_body(
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, filename, content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn session_cookie<B>(response: &Response<B>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub async fn post_form(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    pairs: &[(&str, &str)],
) -> Response<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(form_body(pairs))).unwrap())
        .await
        .unwrap()
}

pub async fn post_multipart(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &str, &[u8])>,
) -> Response<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(multipart_body(fields, file))).unwrap())
        .await
        .unwrap()
}

pub async fn get(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
) -> Response<axum::body::Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Registers an account and returns (session cookie, account id).
pub async fn register(app: &Router, name: &str, email: &str, password: &str) -> (String, i32) {
    let response = post_form(
        app,
        "/auth/register",
        None,
        &[
            ("name", name),
            ("email", email),
            ("password", password),
            ("confirm_password", password),
        ],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "registration failed");

    let cookie = session_cookie(&response);
    let body = json_body(response).await;
    let id = body["data"]["id"].as_i64().expect("account id") as i32;
    (cookie, id)
}

/// Logs in and returns the session cookie.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = post_form(
        app,
        "/auth/login",
        None,
        &[("email", email), ("password", password)],
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK, "login failed");
    session_cookie(&response)
}
