use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{app::build_app, config::AppConfig, state::AppState};

pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self {
            state: AppState::in_memory(Arc::new(AppConfig::local())),
        }
    }

    fn router(&self) -> Router {
        build_app(self.state.clone())
    }
}

pub async fn send_raw(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Token {token}"));
    }
    let res = app
        .router()
        .oneshot(req.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    send_raw(app, method, uri, token, &body).await
}

/// Registers through the API and returns the issued token key.
pub async fn register_user(app: &TestApp, username: &str, email: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/users/",
        None,
        Some(json!({ "username": username, "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
    body["auth_token"]
        .as_str()
        .expect("auth_token in response")
        .to_string()
}
