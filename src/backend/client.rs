// src/backend/client.rs
//! REST calls against the chat backend.

use std::time::Duration;
use reqwest::{Response, StatusCode, Url};

use super::models::{ChatServiceStatus, ErrorBody, Integration, NotionAccount, PageResponse};
use crate::config::{ClientConfig, API_PREFIX};
use crate::error::{ChatError, Result};
use crate::session::UserId;
use crate::{log_debug, log_error};

#[derive(Debug, Clone)]
pub struct BackendClient {
    base: Url,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self { base, http })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.backend_base()?, config.request_timeout())
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        let prefix = format!("{}{}", url.path().trim_end_matches('/'), API_PREFIX);
        url.set_path(&prefix);
        url.set_query(None);

        url.path_segments_mut()
            .map_err(|_| ChatError::Config(format!("backend url '{}' cannot be a base", self.base)))?
            .extend(segments);

        Ok(url)
    }

    /// Full content of a source page. Absent content yields a placeholder.
    pub async fn page_content(&self, page_id: &str) -> Result<String> {
        let url = self.endpoint(&["notion", "pages", page_id])?;
        log_debug!("GET {}", url);

        let response = Self::check(self.http.get(url).send().await?).await?;
        let page: PageResponse = response.json().await?;
        Ok(page.into_display_content())
    }

    pub async fn list_integrations(&self, user_id: &UserId) -> Result<Vec<Integration>> {
        let mut url = self.endpoint(&["integrations"])?;
        url.query_pairs_mut().append_pair("user_id", user_id.as_str());

        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_integration(&self, integration_id: &str) -> Result<()> {
        let url = self.endpoint(&["integrations", integration_id])?;

        let response = self.http.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ChatError::NotFound(format!("integration {}", integration_id)));
        }
        Self::check(response).await?;
        Ok(())
    }

    pub async fn list_notion_accounts(&self, user_id: &UserId) -> Result<Vec<NotionAccount>> {
        let mut url = self.endpoint(&["notion", "accounts"])?;
        url.query_pairs_mut().append_pair("external_user_id", user_id.as_str());

        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn chat_status(&self) -> Result<ChatServiceStatus> {
        let url = self.endpoint(&["chat", "test"])?;

        let response = Self::check(self.http.get(url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody { detail: serde_json::Value::String(detail) }) => detail,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) if body.is_empty() => status.canonical_reason().unwrap_or("request failed").to_string(),
            Err(_) => body,
        };

        log_error!("Backend request failed with {}: {}", status, message);
        Err(ChatError::Backend { status: status.as_u16(), message })
    }
}
