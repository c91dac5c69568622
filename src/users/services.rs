use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{RegisterRequest, RegisteredUser};
use super::repo::{CreateUserError, UserRepo};
use super::repo_types::NewUser;
use crate::{
    auth::{password::hash_password, password::MIN_PASSWORD_LEN, token::generate_key},
    error::{ApiError, FieldErrors},
    validation::{max_chars, min_length_message, required_input, Input, BLANK, REQUIRED},
};

pub const USERNAME_MAX_LEN: usize = 32;
pub const EMAIL_MAX_LEN: usize = 254;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const EMAIL_TAKEN: &str = "A user with that email already exists.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

fn clean_username(value: Input<String>) -> Result<String, String> {
    let username = max_chars(required_input(value)?, USERNAME_MAX_LEN)?;
    if !is_valid_username(&username) {
        return Err(INVALID_USERNAME.into());
    }
    Ok(username)
}

fn clean_email(value: Input<String>) -> Result<String, String> {
    let email = max_chars(required_input(value)?, EMAIL_MAX_LEN)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(INVALID_EMAIL.into());
    }
    Ok(email)
}

fn clean_password(value: Input<String>) -> Result<String, String> {
    let password = value.into_result()?.ok_or_else(|| REQUIRED.to_string())?;
    if password.is_empty() {
        return Err(BLANK.into());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(min_length_message(MIN_PASSWORD_LEN));
    }
    Ok(password)
}

impl From<CreateUserError> for ApiError {
    fn from(err: CreateUserError) -> Self {
        match err {
            CreateUserError::DuplicateUsername => {
                FieldErrors::single("username", USERNAME_TAKEN).into()
            }
            CreateUserError::DuplicateEmail => FieldErrors::single("email", EMAIL_TAKEN).into(),
            CreateUserError::Other(e) => ApiError::Internal(e),
        }
    }
}

/// Validates the request, then creates the user together with its token.
pub async fn register(
    repo: &dyn UserRepo,
    req: RegisterRequest,
) -> Result<RegisteredUser, ApiError> {
    let mut errors = FieldErrors::new();
    let username = errors.collect("username", clean_username(req.username));
    let email = errors.collect("email", clean_email(req.email));
    let password = errors.collect("password", clean_password(req.password));

    if let Some(username) = &username {
        if repo.username_exists(username).await? {
            errors.add("username", USERNAME_TAKEN);
        }
    }
    if let Some(email) = &email {
        if repo.email_exists(email).await? {
            errors.add("email", EMAIL_TAKEN);
        }
    }

    let (username, email, password) = match (username, email, password) {
        (Some(u), Some(e), Some(p)) if errors.is_empty() => (u, e, p),
        _ => {
            warn!(errors = ?errors, "registration rejected");
            return Err(errors.into());
        }
    };

    let password_hash = hash_password(&password)?;
    let (user, token) = repo
        .create_with_token(
            NewUser {
                username,
                email,
                password_hash,
            },
            &generate_key(),
        )
        .await?;

    info!(
        user_id = %user.id,
        username = %user.username,
        token_created = %token.created_at,
        "user registered"
    );
    Ok(RegisteredUser {
        id: user.id,
        username: user.username,
        email: user.email,
        auth_token: token.key,
    })
}
