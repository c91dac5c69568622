use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String, // argon2 PHC string, never serialized
    pub created_at: OffsetDateTime,
}

/// Token row, 1:1 with its user.
#[derive(Debug, Clone, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

/// Already validated and hashed registration data.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
