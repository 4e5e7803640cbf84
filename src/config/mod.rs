use anyhow::{bail, Context};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::storage::{MemoryStorage, PostgresStorage, SqliteStorage, Storage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub frontend: FrontendConfig,
    #[serde(default)]
    pub redirect_status: RedirectMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for acquiring a connection and for a single statement
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Directory holding `index.html` and `stats.html`.
    /// If None, the dashboard pages are not served.
    pub static_dir: Option<String>,
}

/// HTTP status used for redirects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedirectMode {
    #[serde(rename = "301")]
    Moved,
    #[default]
    #[serde(rename = "302")]
    Found,
    #[serde(rename = "307")]
    Temporary,
    #[serde(rename = "308")]
    Permanent,
}

impl RedirectMode {
    pub fn status_code(self) -> StatusCode {
        match self {
            RedirectMode::Moved => StatusCode::MOVED_PERMANENTLY,
            RedirectMode::Found => StatusCode::FOUND,
            RedirectMode::Temporary => StatusCode::TEMPORARY_REDIRECT,
            RedirectMode::Permanent => StatusCode::PERMANENT_REDIRECT,
        }
    }

    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim() {
            "301" => Ok(RedirectMode::Moved),
            "302" => Ok(RedirectMode::Found),
            "307" => Ok(RedirectMode::Temporary),
            "308" => Ok(RedirectMode::Permanent),
            other => bail!("unsupported REDIRECT_STATUS '{other}', expected 301, 302, 307 or 308"),
        }
    }
}

impl DatabaseBackend {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "memory" => DatabaseBackend::Memory,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres, memory"
                );
                DatabaseBackend::Sqlite
            }
        }
    }
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env_or(key, default)
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid number"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend = DatabaseBackend::parse(&env_or("DATABASE_BACKEND", "sqlite"));
        let database_url = env_or("DATABASE_URL", "sqlite://./links.db");
        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS", "5")?;
        let timeout_secs = env_parse::<u64>("DATABASE_TIMEOUT_SECS", "5")?;

        let host = env_or("HOST", "127.0.0.1");
        let port = env_parse::<u16>("PORT", "3000")?;

        let redirect_status = RedirectMode::parse(&env_or("REDIRECT_STATUS", "302"))?;
        let frontend_static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
                timeout_secs,
            },
            server: ServerConfig { host, port },
            frontend: FrontendConfig {
                static_dir: frontend_static_dir,
            },
            redirect_status,
        })
    }

    /// Open and initialize the configured link store.
    pub async fn open_storage(&self) -> anyhow::Result<Arc<dyn Storage>> {
        let db = &self.database;
        let storage: Arc<dyn Storage> = match db.backend {
            DatabaseBackend::Sqlite => {
                tracing::info!("Using SQLite storage: {}", db.url);
                Arc::new(SqliteStorage::new(&db.url, db.max_connections, db.timeout()).await?)
            }
            DatabaseBackend::Postgres => {
                tracing::info!("Using PostgreSQL storage");
                Arc::new(PostgresStorage::new(&db.url, db.max_connections, db.timeout()).await?)
            }
            DatabaseBackend::Memory => {
                tracing::warn!("Using in-memory storage, links are lost on shutdown");
                Arc::new(MemoryStorage::new())
            }
        };

        storage
            .init()
            .await
            .context("failed to initialize database schema")?;

        Ok(storage)
    }
}
