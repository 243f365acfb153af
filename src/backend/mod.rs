// src/backend/mod.rs
mod client;
mod models;

use async_trait::async_trait;

use crate::error::Result;

pub use client::BackendClient;
pub use models::{ChatServiceStatus, Integration, NotionAccount, PageResponse, NO_CONTENT_PLACEHOLDER};

/// Read-only source of full page content, keyed by source id.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, page_id: &str) -> Result<String>;
}

#[async_trait]
impl PageSource for BackendClient {
    async fn fetch_page(&self, page_id: &str) -> Result<String> {
        self.page_content(page_id).await
    }
}
