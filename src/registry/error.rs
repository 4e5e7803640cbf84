use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("short code '{0}' already exists")]
    AlreadyExists(String),
    #[error("short code '{0}' not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl RegistryError {
    /// Whether the caller caused the failure (as opposed to the server).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, RegistryError::StorageUnavailable(_))
    }

    pub(crate) fn from_storage(err: StorageError, code: &str) -> Self {
        match err {
            StorageError::Conflict => RegistryError::AlreadyExists(code.to_string()),
            StorageError::NotFound => RegistryError::NotFound(code.to_string()),
            StorageError::Backend(cause) => RegistryError::StorageUnavailable(cause),
        }
    }
}

impl From<StorageError> for RegistryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Backend(cause) => RegistryError::StorageUnavailable(cause),
            other => RegistryError::StorageUnavailable(other.into()),
        }
    }
}
