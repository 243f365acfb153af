// src/session/types.rs
use std::fmt;
use serde::{Deserialize, Serialize};

/// Opaque identity issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub message_id: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            message_id: None,
        }
    }

    pub fn assistant(message_id: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: String::new(),
            message_id: Some(message_id.into()),
        }
    }
}

/// A retrieved excerpt used as grounding evidence for an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    #[serde(rename = "page_title", default)]
    pub source_title: String,
    #[serde(rename = "chunk_content", default)]
    pub excerpt: String,
    #[serde(rename = "similarity_score", default)]
    pub relevance: f64,
    #[serde(rename = "page_id", default)]
    pub source_id: String,
}

impl RetrievedChunk {
    /// Relevance as a percentage with one decimal, e.g. `87.5%`.
    pub fn relevance_label(&self) -> String {
        format!("{:.1}%", self.relevance.clamp(0.0, 1.0) * 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SidePanelTab {
    #[default]
    Chunks,
    Page,
}

impl SidePanelTab {
    pub fn toggle(self) -> Self {
        match self {
            SidePanelTab::Chunks => SidePanelTab::Page,
            SidePanelTab::Page => SidePanelTab::Chunks,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SidePanelTab::Chunks => "Chunks",
            SidePanelTab::Page => "Page",
        }
    }
}

/// Edits applied to the session's input buffer, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    Insert(char),
    Backspace,
    Clear,
    Replace(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Error,
}

/// User-visible notices raised by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Connected,
    Disconnected,
    ConnectionError(String),
    GenerationStopped,
    ServerError(String),
    IdleTimeout,
    PageLoadFailed,
}

impl Notification {
    pub fn severity(&self) -> Severity {
        match self {
            Notification::Connected => Severity::Success,
            Notification::GenerationStopped => Severity::Info,
            Notification::Disconnected
            | Notification::ConnectionError(_)
            | Notification::ServerError(_)
            | Notification::IdleTimeout
            | Notification::PageLoadFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::Connected => f.write_str("Connected to chat"),
            Notification::Disconnected => f.write_str("Disconnected from chat"),
            Notification::ConnectionError(reason) => write!(f, "Connection error: {}", reason),
            Notification::GenerationStopped => f.write_str("Generation stopped"),
            Notification::ServerError(message) => f.write_str(message),
            Notification::IdleTimeout => f.write_str("Connection timed out due to inactivity"),
            Notification::PageLoadFailed => f.write_str("Failed to load page content"),
        }
    }
}
