use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo::WishRepo;
use super::repo_types::{Page, Wish, WishFields};

/// Process-local wish store, kept in insertion order.
#[derive(Default)]
pub struct MemoryWishRepo {
    rows: RwLock<Vec<Wish>>,
}

impl MemoryWishRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishRepo for MemoryWishRepo {
    async fn list_by_owner(&self, owner_id: Uuid, page: Page) -> anyhow::Result<Vec<Wish>> {
        let rows = self.rows.read().await;
        let offset = usize::try_from(page.offset)?;
        let limit = match page.limit {
            Some(l) => usize::try_from(l)?,
            None => usize::MAX,
        };
        Ok(rows
            .iter()
            .filter(|w| w.owner_id == owner_id)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<Option<Wish>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|w| w.id == id && w.owner_id == owner_id)
            .cloned())
    }

    async fn create(&self, owner_id: Uuid, fields: WishFields) -> anyhow::Result<Wish> {
        let wish = Wish {
            id: Uuid::new_v4(),
            owner_id,
            title: fields.title,
            price: fields.price,
            link: fields.link,
            description: fields.description,
            created_at: OffsetDateTime::now_utc(),
        };
        self.rows.write().await.push(wish.clone());
        Ok(wish)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        fields: WishFields,
    ) -> anyhow::Result<Option<Wish>> {
        let mut rows = self.rows.write().await;
        let Some(wish) = rows
            .iter_mut()
            .find(|w| w.id == id && w.owner_id == owner_id)
        else {
            return Ok(None);
        };
        wish.title = fields.title;
        wish.price = fields.price;
        wish.link = fields.link;
        wish.description = fields.description;
        Ok(Some(wish.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|w| !(w.id == id && w.owner_id == owner_id));
        Ok(rows.len() < before)
    }
}
