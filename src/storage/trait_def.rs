use crate::models::LinkRecord;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error("short code not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Backend(err.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Current UTC time as unix seconds.
pub(crate) fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, indexes)
    async fn init(&self) -> Result<()>;

    /// Insert a new link with zero clicks.
    ///
    /// Fails with [`StorageError::Conflict`] if the code is taken; the existing
    /// record is left untouched.
    async fn create(&self, code: &str, target_url: &str) -> StorageResult<LinkRecord>;

    /// Get a link by code
    async fn get(&self, code: &str) -> StorageResult<Option<LinkRecord>>;

    /// All links, most recently created first
    async fn list(&self) -> StorageResult<Vec<LinkRecord>>;

    /// Remove a link. Fails with [`StorageError::NotFound`] if nothing was removed.
    async fn delete(&self, code: &str) -> StorageResult<()>;

    /// Count a click and return the target in one atomic step.
    ///
    /// Returns `None` without touching anything when the code does not exist.
    async fn resolve_and_record_click(&self, code: &str) -> StorageResult<Option<String>>;

    /// Release connections. Further calls after this fail with a backend error.
    async fn close(&self);
}
