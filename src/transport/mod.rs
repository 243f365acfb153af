// src/transport/mod.rs
//! Transport seam between the session actor and the wire.

mod websocket;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::Result;

pub use websocket::{WsConnector, WsTransport};

/// One established, ordered, bidirectional text-frame connection.
#[async_trait]
pub trait FrameTransport: Send {
    async fn send_text(&mut self, text: String) -> Result<()>;

    /// Next inbound text frame. `None` means the peer closed cleanly.
    async fn recv_text(&mut self) -> Option<Result<String>>;

    async fn close(&mut self) -> Result<()>;
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn FrameTransport>>;
}
