use axum::{extract::{rejection::JsonRejection, State}, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{TokenRequest, TokenResponse},
    services,
};
use crate::{error::ApiError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/token/", post(obtain_token))
}

#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let token = services::obtain_token(state.users.as_ref(), payload).await?;
    Ok(Json(token))
}
