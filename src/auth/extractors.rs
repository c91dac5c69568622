use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use super::services::authenticate;
use crate::{error::ApiError, state::AppState};

/// Resolves the `Authorization: Token <key>` header to the caller's user id.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let user_id = authenticate(state.users.as_ref(), header).await?;
        Ok(AuthUser(user_id))
    }
}
