use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;
use crate::validation::Input;

/// Request body for user registration. Missing or mistyped fields are
/// reported as validation errors rather than rejected by the JSON extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: Input<String>,
    pub email: Input<String>,
    pub password: Input<String>,
}

/// Returned once, right after registration.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub auth_token: String,
}

/// Public part of the user returned by the listing endpoints.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}
