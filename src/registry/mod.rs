//! Registry service: validation and error mapping over a [`Storage`].
//!
//! Target URLs are normalized once, when a link is created, and stored in
//! normalized form. Everything downstream (get, list, resolve) returns the
//! stored value as-is.

mod error;

pub use error::RegistryError;

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::models::LinkRecord;
use crate::storage::{Storage, StorageError};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Prepend `https://` unless the URL already carries an http(s) scheme.
pub fn normalize_target_url(url: &str) -> String {
    let has_scheme = ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    });

    if has_scheme {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

fn required<'a>(value: Option<&'a str>, what: &'static str) -> RegistryResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RegistryError::InvalidInput(what)),
    }
}

#[derive(Clone)]
pub struct LinkRegistry {
    storage: Arc<dyn Storage>,
}

impl LinkRegistry {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Create a link. Inputs are trimmed; empty or missing values are rejected
    /// before the store is touched.
    pub async fn create_link(
        &self,
        code: Option<&str>,
        url: Option<&str>,
    ) -> RegistryResult<LinkRecord> {
        let code = required(code, "code is required")?;
        let url = required(url, "url is required")?;
        let target_url = normalize_target_url(url);

        match self.storage.create(code, &target_url).await {
            Ok(link) => {
                info!(code = %code, target_url = %target_url, "link created");
                Ok(link)
            }
            Err(err) => Err(self.storage_failure(err, code, "create")),
        }
    }

    pub async fn list_links(&self) -> RegistryResult<Vec<LinkRecord>> {
        self.storage.list().await.map_err(|err| {
            error!(error = %err, "failed to list links");
            RegistryError::from(err)
        })
    }

    pub async fn get_link(&self, code: &str) -> RegistryResult<LinkRecord> {
        match self.storage.get(code).await {
            Ok(Some(link)) => Ok(link),
            Ok(None) => Err(RegistryError::NotFound(code.to_string())),
            Err(err) => Err(self.storage_failure(err, code, "get")),
        }
    }

    /// Delete a link. Unknown codes are reported as [`RegistryError::NotFound`].
    pub async fn delete_link(&self, code: &str) -> RegistryResult<()> {
        match self.storage.delete(code).await {
            Ok(()) => {
                info!(code = %code, "link deleted");
                Ok(())
            }
            Err(err) => Err(self.storage_failure(err, code, "delete")),
        }
    }

    /// Count a click and return the absolute target URL to redirect to.
    pub async fn resolve(&self, code: &str) -> RegistryResult<String> {
        match self.storage.resolve_and_record_click(code).await {
            Ok(Some(target_url)) => {
                debug!(code = %code, target_url = %target_url, "link resolved");
                Ok(target_url)
            }
            Ok(None) => Err(RegistryError::NotFound(code.to_string())),
            Err(err) => Err(self.storage_failure(err, code, "resolve")),
        }
    }

    fn storage_failure(&self, err: StorageError, code: &str, op: &str) -> RegistryError {
        if let StorageError::Backend(ref cause) = err {
            error!(code = %code, op, error = %cause, "storage operation failed");
        }
        RegistryError::from_storage(err, code)
    }
}
