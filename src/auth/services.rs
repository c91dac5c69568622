use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::{TokenRequest, TokenResponse};
use super::password::verify_password;
use super::token::parse_authorization;
use crate::{
    error::{ApiError, FieldErrors},
    users::repo::UserRepo,
    validation::{required_input, BLANK, REQUIRED},
};

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// Resolves an `Authorization` header value to the id of the token's owner.
pub async fn authenticate(repo: &dyn UserRepo, header: Option<&str>) -> Result<Uuid, ApiError> {
    let key = parse_authorization(header)?;
    match repo.find_by_token(key).await? {
        Some(user) => {
            debug!(user_id = %user.id, "token authenticated");
            Ok(user.id)
        }
        None => {
            warn!("unknown token");
            Err(ApiError::Unauthorized("Invalid token."))
        }
    }
}

/// Checks username/password and hands back the user's existing token.
pub async fn obtain_token(
    repo: &dyn UserRepo,
    req: TokenRequest,
) -> Result<TokenResponse, ApiError> {
    let mut errors = FieldErrors::new();
    let username = errors.collect("username", required_input(req.username));
    let password = match req.password.into_result() {
        Ok(Some(p)) if p.is_empty() => Err(BLANK.to_string()),
        Ok(Some(p)) => Ok(p),
        Ok(None) => Err(REQUIRED.to_string()),
        Err(msg) => Err(msg),
    };
    let password = errors.collect("password", password);
    let (Some(username), Some(password)) = (username, password) else {
        return Err(errors.into());
    };

    let user = repo.find_by_username(&username).await?;
    let verified = match &user {
        Some(u) => verify_password(&password, &u.password_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        warn!(username = %username, "token request with bad credentials");
        return Err(FieldErrors::single("non_field_errors", BAD_CREDENTIALS).into());
    };

    let token = repo
        .token_for(user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {} has no auth token", user.id))?;
    Ok(TokenResponse { token: token.key })
}
