use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Wish;
use crate::validation::Input;

/// Body of create/update requests. Any `owner` sent by the client is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct WishPayload {
    pub title: Input<String>,
    pub price: Input<f64>,
    pub link: Input<String>,
    pub description: Input<String>,
}

#[derive(Debug, Serialize)]
pub struct WishResponse {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub link: String,
    pub description: String,
}

impl From<Wish> for WishResponse {
    fn from(w: Wish) -> Self {
        Self {
            id: w.id,
            title: w.title,
            price: w.price,
            link: w.link,
            description: w.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
