use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A short code and the target it redirects to, plus its click statistics.
///
/// Timestamps are UTC unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LinkRecord {
    pub code: String,
    pub target_url: String,
    pub click_count: i64,
    pub last_clicked_at: Option<i64>,
    pub created_at: i64,
}

impl LinkRecord {
    pub fn new(code: &str, target_url: &str, created_at: i64) -> Self {
        Self {
            code: code.to_string(),
            target_url: target_url.to_string(),
            click_count: 0,
            last_clicked_at: None,
            created_at,
        }
    }
}

/// Both fields are optional so a missing field is reported as invalid input
/// rather than rejected by the JSON extractor.
#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
