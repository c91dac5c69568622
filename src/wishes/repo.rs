use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Page, Wish, WishFields};

/// Wish storage. Every method takes the owner and never touches another
/// owner's rows, so "not yours" and "does not exist" look the same.
#[async_trait]
pub trait WishRepo: Send + Sync {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> anyhow::Result<Vec<Wish>>;
    async fn get(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<Wish>>;
    async fn create(&self, owner_id: Uuid, fields: WishFields) -> anyhow::Result<Wish>;
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        fields: WishFields,
    ) -> anyhow::Result<Option<Wish>>;
    /// Returns whether a row was removed.
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

#[derive(Clone)]
pub struct PgWishRepo {
    db: PgPool,
}

impl PgWishRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WishRepo for PgWishRepo {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> anyhow::Result<Vec<Wish>> {
        let rows = sqlx::query_as::<_, Wish>(
            r#"
            SELECT id, owner_id, title, price, link, description, created_at
              FROM wishes
             WHERE owner_id = $1
             ORDER BY created_at ASC, id ASC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.db)
        .await
        .context("list wishes by owner")?;
        Ok(rows)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<Wish>> {
        let wish = sqlx::query_as::<_, Wish>(
            r#"
            SELECT id, owner_id, title, price, link, description, created_at
              FROM wishes
             WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .context("get wish")?;
        Ok(wish)
    }

    async fn create(&self, owner_id: Uuid, fields: WishFields) -> anyhow::Result<Wish> {
        let wish = sqlx::query_as::<_, Wish>(
            r#"
            INSERT INTO wishes (owner_id, title, price, link, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, owner_id, title, price, link, description, created_at
            "#,
        )
        .bind(owner_id)
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.link)
        .bind(&fields.description)
        .fetch_one(&self.db)
        .await
        .context("insert wish")?;
        Ok(wish)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        fields: WishFields,
    ) -> anyhow::Result<Option<Wish>> {
        let wish = sqlx::query_as::<_, Wish>(
            r#"
            UPDATE wishes
               SET title = $3, price = $4, link = $5, description = $6
             WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, price, link, description, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&fields.title)
        .bind(fields.price)
        .bind(&fields.link)
        .bind(&fields.description)
        .fetch_optional(&self.db)
        .await
        .context("update wish")?;
        Ok(wish)
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM wishes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .context("delete wish")?;
        Ok(res.rows_affected() > 0)
    }
}
