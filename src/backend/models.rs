// src/backend/models.rs
use serde::{Deserialize, Serialize};

pub const NO_CONTENT_PLACEHOLDER: &str = "No content available";

#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

impl PageResponse {
    /// Missing or empty content is shown as a placeholder, not an error.
    pub fn into_display_content(self) -> String {
        self.content
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub app_id: String,
    pub app_name: String,
    pub account_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionAccount {
    pub account_id: String,
    #[serde(default)]
    pub app_id: String,
    pub app_name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatServiceStatus {
    pub message: String,
    #[serde(default)]
    pub websocket_path: String,
}

/// FastAPI style `{"detail": "..."}` error body.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}
