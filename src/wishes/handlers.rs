use anyhow::Context;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{Pagination, WishPayload, WishResponse},
    services,
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState};

pub fn wish_routes() -> Router<AppState> {
    Router::new()
        .route("/wishes/", get(list_wishes).post(create_wish))
        .route(
            "/wishes/:id/",
            get(get_wish)
                .put(replace_wish)
                .patch(patch_wish)
                .delete(delete_wish),
        )
}

/// Unparseable ids can never name one of the caller's wishes.
fn wish_id(id: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn list_wishes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    pagination: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<WishResponse>>, ApiError> {
    let Query(pagination) = pagination?;
    let wishes = services::list_wishes(state.wishes.as_ref(), user_id, pagination).await?;
    Ok(Json(wishes.into_iter().map(WishResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_wish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<WishResponse>, ApiError> {
    let wish = services::get_wish(state.wishes.as_ref(), user_id, wish_id(id)?).await?;
    Ok(Json(wish.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_wish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<WishPayload>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<WishResponse>), ApiError> {
    let Json(payload) = payload?;
    let wish = services::create_wish(state.wishes.as_ref(), user_id, payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        LOCATION,
        HeaderValue::from_str(&format!("/wishes/{}/", wish.id)).context("location header")?,
    );
    Ok((StatusCode::CREATED, headers, Json(wish.into())))
}

#[instrument(skip(state, payload))]
pub async fn replace_wish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WishPayload>, JsonRejection>,
) -> Result<Json<WishResponse>, ApiError> {
    update(state, user_id, id, payload, false).await
}

#[instrument(skip(state, payload))]
pub async fn patch_wish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WishPayload>, JsonRejection>,
) -> Result<Json<WishResponse>, ApiError> {
    update(state, user_id, id, payload, true).await
}

async fn update(
    state: AppState,
    user_id: Uuid,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<WishPayload>, JsonRejection>,
    partial: bool,
) -> Result<Json<WishResponse>, ApiError> {
    let id = wish_id(id)?;
    let payload = match payload {
        Ok(Json(p)) => p,
        Err(rejection) => {
            // a foreign or missing wish is a 404 even when the body is broken
            services::get_wish(state.wishes.as_ref(), user_id, id).await?;
            return Err(rejection.into());
        }
    };
    let wish =
        services::update_wish(state.wishes.as_ref(), user_id, id, payload, partial).await?;
    Ok(Json(wish.into()))
}

#[instrument(skip(state))]
pub async fn delete_wish(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    services::delete_wish(state.wishes.as_ref(), user_id, wish_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}
