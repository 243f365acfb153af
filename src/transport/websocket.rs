// src/transport/websocket.rs
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::{Connector, FrameTransport};
use crate::error::{ChatError, Result};
use crate::{log_debug, log_info, log_warn};

/// Opens WebSocket connections with tokio-tungstenite.
#[derive(Debug, Clone, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn FrameTransport>> {
        log_info!("Opening chat socket to {}", redact_query(endpoint));
        let (stream, response) = tokio_tungstenite::connect_async(endpoint.as_str()).await?;
        log_debug!("Handshake completed with status {}", response.status());
        Ok(Box::new(WsTransport::new(stream)))
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl FrameTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.stream.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    async fn recv_text(&mut self) -> Option<Result<String>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => return None,
                Err(e) => return Some(Err(e.into())),
            };

            match message {
                WsMessage::Text(text) => return Some(Ok(text)),
                WsMessage::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => log_warn!("Dropping non UTF-8 binary frame"),
                },
                WsMessage::Close(frame) => {
                    log_info!("Server closed chat socket: {:?}", frame);
                    return None;
                }
                // Control pings are answered by tungstenite itself.
                WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) | Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(ChatError::from(e)),
        }
    }
}

/// Endpoint without its query string, which carries the user id.
fn redact_query(endpoint: &Url) -> String {
    let mut shown = endpoint.clone();
    shown.set_query(None);
    shown.to_string()
}
