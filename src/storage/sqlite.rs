use crate::models::LinkRecord;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        // The autoincrement id gives the insertion order used by list()
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                target_url TEXT NOT NULL,
                click_count INTEGER NOT NULL DEFAULT 0,
                last_clicked_at INTEGER,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_links_code ON links(code)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn create(&self, code: &str, target_url: &str) -> StorageResult<LinkRecord> {
        let created_at = unix_now();

        let result = sqlx::query(
            r#"
            INSERT INTO links (code, target_url, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT(code) DO NOTHING
            "#,
        )
        .bind(code)
        .bind(target_url)
        .bind(created_at)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        Ok(LinkRecord::new(code, target_url, created_at))
    }

    async fn get(&self, code: &str) -> StorageResult<Option<LinkRecord>> {
        let link = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT code, target_url, click_count, last_clicked_at, created_at
            FROM links
            WHERE code = ?
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(link)
    }

    async fn list(&self) -> StorageResult<Vec<LinkRecord>> {
        let links = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT code, target_url, click_count, last_clicked_at, created_at
            FROM links
            ORDER BY id DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(links)
    }

    async fn delete(&self, code: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM links WHERE code = ?")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    async fn resolve_and_record_click(&self, code: &str) -> StorageResult<Option<String>> {
        let target = sqlx::query_scalar::<_, String>(
            r#"
            UPDATE links
            SET click_count = click_count + 1, last_clicked_at = ?
            WHERE code = ?
            RETURNING target_url
            "#,
        )
        .bind(unix_now())
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(target)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
