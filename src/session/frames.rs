// src/session/frames.rs
//! Wire frames exchanged over the chat socket. Every frame is a JSON object
//! with a `type` discriminator.

use serde::{Deserialize, Serialize};

use super::types::RetrievedChunk;

/// Client -> server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Pong,
    Chat {
        message: String,
        conversation_id: Option<String>,
    },
    StopGeneration {
        message_id: String,
    },
}

impl ClientFrame {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Server -> client. Kinds this client does not know decode to `Unknown`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Ping,
    ConversationId {
        data: String,
    },
    StreamStart {
        message_id: String,
    },
    Chunks {
        #[serde(default)]
        data: Option<Vec<RetrievedChunk>>,
    },
    Stream {
        #[serde(default)]
        content: String,
    },
    Complete,
    GenerationStopped,
    Error {
        #[serde(default)]
        message: Option<String>,
    },
    IdleTimeout,
    #[serde(other)]
    Unknown,
}

impl ServerFrame {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ServerFrame::Ping => "ping",
            ServerFrame::ConversationId { .. } => "conversation_id",
            ServerFrame::StreamStart { .. } => "stream_start",
            ServerFrame::Chunks { .. } => "chunks",
            ServerFrame::Stream { .. } => "stream",
            ServerFrame::Complete => "complete",
            ServerFrame::GenerationStopped => "generation_stopped",
            ServerFrame::Error { .. } => "error",
            ServerFrame::IdleTimeout => "idle_timeout",
            ServerFrame::Unknown => "unknown",
        }
    }
}
