use serde::{Deserialize, Serialize};

use crate::validation::Input;

/// Request body for exchanging credentials for the user's token.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    pub username: Input<String>,
    pub password: Input<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
