use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{PublicUser, RegisterRequest, RegisteredUser},
    services,
};
use crate::{error::ApiError, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list_users).post(register))
        .route("/users/:id/", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<RegisteredUser>), ApiError> {
    let Json(payload) = payload?;
    let user = services::register(state.users.as_ref(), payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&format!("/users/{}/", user.id)).context("location header")?,
    );
    Ok((StatusCode::CREATED, headers, Json(user)))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PublicUser>, ApiError> {
    let Ok(Path(id)) = id else {
        return Err(ApiError::NotFound);
    };
    let user = state.users.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_support::{register_user, send, TestApp};

    #[tokio::test]
    async fn register_returns_created_user_with_token() {
        let app = TestApp::new();
        register_user(&app, "test-user", "test@example.com", "test-password").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users/",
            None,
            Some(json!({
                "username": "foobar",
                "email": "foobar@example.com",
                "password": "somepassword"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "foobar");
        assert_eq!(body["email"], "foobar@example.com");
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());

        let users = app.state.users.list().await.unwrap();
        assert_eq!(users.len(), 2);
        let created = users.iter().find(|u| u.username == "foobar").unwrap();
        let token = app.state.users.token_for(created.id).await.unwrap().unwrap();
        assert_eq!(body["auth_token"], token.key);
    }

    #[tokio::test]
    async fn short_password_is_a_field_error() {
        let app = TestApp::new();
        register_user(&app, "test-user", "test@example.com", "test-password").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users/",
            None,
            Some(json!({
                "username": "foobar",
                "email": "foobarbaz@example.com",
                "password": "foo"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["password"].as_array().unwrap().len(), 1);
        assert_eq!(app.state.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_field_error() {
        let app = TestApp::new();
        register_user(&app, "test-user", "test@example.com", "test-password").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/users/",
            None,
            Some(json!({
                "username": "testuser2",
                "email": "test@example.com",
                "password": "testuser"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["email"], json!(["A user with that email already exists."]));
        assert_eq!(app.state.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mistyped_fields_are_field_errors() {
        let app = TestApp::new();

        let (status, body) = send(
            &app,
            Method::POST,
            "/users/",
            None,
            Some(json!({"username": {"name": "foobar"}, "email": null, "password": 12345678})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["username"], json!(["Not a valid string."]));
        assert_eq!(body["email"], json!(["This field may not be null."]));
        assert!(body.get("password").is_none());
        assert!(app.state.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = TestApp::new();
        let (status, body) = crate::test_support::send_raw(
            &app,
            Method::POST,
            "/users/",
            None,
            "{not json",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn listing_and_detail_never_expose_secrets() {
        let app = TestApp::new();
        let token = register_user(&app, "test-user", "test@example.com", "test-password").await;

        let (status, body) = send(&app, Method::GET, "/users/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let list = body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["username"], "test-user");
        assert!(list[0].get("auth_token").is_none());
        assert!(!body.to_string().contains(&token));

        let id = list[0]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, Method::GET, &format!("/users/{id}/"), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "test@example.com");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let app = TestApp::new();
        let (status, _) = send(
            &app,
            Method::GET,
            &format!("/users/{}/", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/users/42/", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn token_endpoint_returns_registration_token() {
        let app = TestApp::new();
        let token = register_user(&app, "test-user", "test@example.com", "test-password").await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/token/",
            None,
            Some(json!({"username": "test-user", "password": "test-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token"], token);

        let (status, body) = send(
            &app,
            Method::POST,
            "/auth/token/",
            None,
            Some(json!({"username": "test-user", "password": "nope-nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["non_field_errors"].as_array().unwrap().len(), 1);
    }
}
