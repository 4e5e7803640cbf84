use crate::models::LinkRecord;
use crate::storage::trait_def::unix_now;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub struct PostgresStorage {
    pool: Arc<PgPool>,
}

impl PostgresStorage {
    pub async fn new(database_url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        let statement_timeout = timeout.as_millis().to_string();
        let options = PgConnectOptions::from_str(database_url)?
            .options([("statement_timeout", statement_timeout.as_str())]);

        let pool = PgPoolOptions::new()
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
impl Storage for PostgresStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS links (
                id BIGSERIAL PRIMARY KEY,
                code TEXT NOT NULL UNIQUE,
                target_url TEXT NOT NULL,
                click_count BIGINT NOT NULL DEFAULT 0,
                last_clicked_at BIGINT,
                created_at BIGINT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create(&self, code: &str, target_url: &str) -> StorageResult<LinkRecord> {
        let created_at = unix_now();

        let row = sqlx::query_as::<_, LinkRecord>(
            r#"
            INSERT INTO links (code, target_url, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (code) DO NOTHING
            RETURNING code, target_url, click_count, last_clicked_at, created_at
            "#,
        )
        .bind(code)
        .bind(target_url)
        .bind(created_at)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.ok_or(StorageError::Conflict)
    }

    async fn get(&self, code: &str) -> StorageResult<Option<LinkRecord>> {
        let link = sqlx::query_as::<_, LinkRecord>(
            r#"
            SELECT code, target_url, click_count, last_clicked_at, created_at
            FROM links
            WHERE code = $1
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
        let result = sqlx::query(
            r#"
            DELETE FROM links
            WHERE code = $1
            "#,
        )
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
            SET click_count = click_count + 1, last_clicked_at = $1
            WHERE code = $2
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
