use std::sync::Arc;

use crate::config::AppConfig;
use crate::users::{memory::MemoryUserRepo, repo::{PgUserRepo, UserRepo}};
use crate::wishes::{memory::MemoryWishRepo, repo::{PgWishRepo, WishRepo}};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub wishes: Arc<dyn WishRepo>,
}

impl AppState {
    /// Postgres-backed state when a database is configured, in-memory otherwise.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        match &config.database {
            Some(db_config) => {
                let db = crate::db::connect(db_config).await?;
                crate::db::migrate(&db).await?;
                Ok(Self::from_parts(
                    config.clone(),
                    Arc::new(PgUserRepo::new(db.clone())),
                    Arc::new(PgWishRepo::new(db)),
                ))
            }
            None => {
                tracing::warn!(
                    "DATABASE_URL not set; using in-memory store, data will not survive a restart"
                );
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        wishes: Arc<dyn WishRepo>,
    ) -> Self {
        Self {
            config,
            users,
            wishes,
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            config,
            Arc::new(MemoryUserRepo::new()),
            Arc::new(MemoryWishRepo::new()),
        )
    }
}
