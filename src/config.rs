use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|v| v.parse::<u32>().ok())
                    .unwrap_or(10),
            }),
            _ => None,
        };
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {v}"))?,
            Err(_) => 8080,
        };
        Ok(Self {
            database,
            host,
            port,
        })
    }

    #[cfg(test)]
    pub fn local() -> Self {
        Self {
            database: None,
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}
