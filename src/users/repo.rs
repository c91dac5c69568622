use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{AuthToken, NewUser, User};

#[derive(Debug, thiserror::Error)]
pub enum CreateUserError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Storage for users and their auth tokens.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;

    /// Inserts the user and its token as one unit: either both exist afterwards or neither.
    async fn create_with_token(
        &self,
        user: NewUser,
        token_key: &str,
    ) -> Result<(User, AuthToken), CreateUserError>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_token(&self, key: &str) -> anyhow::Result<Option<User>>;
    async fn token_for(&self, user_id: Uuid) -> anyhow::Result<Option<AuthToken>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
}

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, created_at";

// Constraint names declared in migrations/0001_init.sql.
const USERNAME_KEY: &str = "users_username_key";
const EMAIL_KEY: &str = "users_email_key";

fn duplicate_for(constraint: Option<&str>) -> Option<CreateUserError> {
    match constraint? {
        USERNAME_KEY => Some(CreateUserError::DuplicateUsername),
        EMAIL_KEY => Some(CreateUserError::DuplicateEmail),
        _ => None,
    }
}

fn classify_insert_error(err: sqlx::Error) -> CreateUserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            if let Some(dup) = duplicate_for(db_err.constraint()) {
                return dup;
            }
        }
    }
    CreateUserError::Other(anyhow::Error::new(err).context("insert user"))
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.db)
                .await
                .context("check username")?;
        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await
                .context("check email")?;
        Ok(exists)
    }

    async fn create_with_token(
        &self,
        user: NewUser,
        token_key: &str,
    ) -> Result<(User, AuthToken), CreateUserError> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_insert_error)?;

        let token = sqlx::query_as::<_, AuthToken>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(token_key)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .context("insert auth token")?;

        tx.commit().await.context("commit tx")?;
        Ok((user, token))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn find_by_token(&self, key: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.email, u.password_hash, u.created_at
              FROM auth_tokens t
              JOIN users u ON u.id = t.user_id
             WHERE t.key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .context("find user by token")?;
        Ok(user)
    }

    async fn token_for(&self, user_id: Uuid) -> anyhow::Result<Option<AuthToken>> {
        let token = sqlx::query_as::<_, AuthToken>(
            "SELECT key, user_id, created_at FROM auth_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("find token by user")?;
        Ok(token)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(users)
    }
}
