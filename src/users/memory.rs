use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::{CreateUserError, UserRepo};
use super::repo_types::{AuthToken, NewUser, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tokens: Vec<AuthToken>,
}

/// Process-local user store. Data is lost on restart.
#[derive(Default)]
pub struct MemoryUserRepo {
    tables: RwLock<Tables>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().any(|u| u.email == email))
    }

    async fn create_with_token(
        &self,
        user: NewUser,
        token_key: &str,
    ) -> Result<(User, AuthToken), CreateUserError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(CreateUserError::DuplicateUsername);
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(CreateUserError::DuplicateEmail);
        }
        if tables.tokens.iter().any(|t| t.key == token_key) {
            return Err(anyhow::anyhow!("duplicate token key").into());
        }

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
        };
        let token = AuthToken {
            key: token_key.to_string(),
            user_id: user.id,
            created_at: now,
        };
        tables.users.push(user.clone());
        tables.tokens.push(token.clone());
        Ok((user, token))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_token(&self, key: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        let Some(token) = tables.tokens.iter().find(|t| t.key == key) else {
            return Ok(None);
        };
        Ok(tables.users.iter().find(|u| u.id == token.user_id).cloned())
    }

    async fn token_for(&self, user_id: Uuid) -> anyhow::Result<Option<AuthToken>> {
        let tables = self.tables.read().await;
        Ok(tables.tokens.iter().find(|t| t.user_id == user_id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let mut users = self.tables.read().await.users.clone();
        // stable, so users created in the same instant stay in insertion order
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}
