use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Wish {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub price: f64,
    pub link: String,
    pub description: String,
    pub created_at: OffsetDateTime,
}

/// Validated, writable part of a wish. The owner is never part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct WishFields {
    pub title: String,
    pub price: f64,
    pub link: String,
    pub description: String,
}

/// Window over a caller's list. `limit: None` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}
