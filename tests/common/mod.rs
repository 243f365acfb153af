#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use notion_chat_client::backend::PageSource;
use notion_chat_client::error::{ChatError, Result};
use notion_chat_client::session::{ChatSession, Notification, SessionState};
use notion_chat_client::transport::{Connector, FrameTransport};
use reqwest::Url;
use serde_json::Value;
use tokio::sync::{mpsc, Notify};

pub const WAIT: Duration = Duration::from_secs(5);

/// Client end of an in-memory connection.
pub struct ChannelTransport {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl FrameTransport for ChannelTransport {
    async fn send_text(&mut self, text: String) -> Result<()> {
        self.outbound
            .send(text)
            .map_err(|_| ChatError::Transport("peer went away".to_string()))
    }

    async fn recv_text(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Server end of an in-memory connection.
pub struct FakeServer {
    pub to_client: mpsc::UnboundedSender<String>,
    pub from_client: mpsc::UnboundedReceiver<String>,
    pub closed: Arc<AtomicBool>,
}

impl FakeServer {
    pub fn push(&self, frame: Value) {
        self.to_client.send(frame.to_string()).expect("client transport dropped");
    }

    pub fn push_raw(&self, text: &str) {
        self.to_client.send(text.to_string()).expect("client transport dropped");
    }

    pub async fn next_frame(&mut self) -> Value {
        let text = tokio::time::timeout(WAIT, self.from_client.recv())
            .await
            .expect("timed out waiting for a client frame")
            .expect("client transport dropped");
        serde_json::from_str(&text).expect("client sent invalid json")
    }

    pub fn try_next_frame(&mut self) -> Option<Value> {
        self.from_client
            .try_recv()
            .ok()
            .map(|text| serde_json::from_str(&text).expect("client sent invalid json"))
    }

    pub fn is_closed_by_client(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// The client dropped its end of the connection.
    pub fn client_gone(&self) -> bool {
        self.to_client.is_closed()
    }
}

pub fn channel_pair() -> (ChannelTransport, FakeServer) {
    let (to_client, inbound) = mpsc::unbounded_channel();
    let (outbound, from_client) = mpsc::unbounded_channel();
    let closed = Arc::new(AtomicBool::new(false));

    let transport = ChannelTransport { inbound, outbound, closed: Arc::clone(&closed) };
    let server = FakeServer { to_client, from_client, closed };
    (transport, server)
}

pub enum ConnectOutcome {
    Ready(ChannelTransport),
    Fail(String),
    Hang,
}

/// Hands out a prepared outcome on the first connect.
pub struct ChannelConnector {
    outcome: Mutex<Option<ConnectOutcome>>,
}

impl ChannelConnector {
    pub fn new(outcome: ConnectOutcome) -> Self {
        Self { outcome: Mutex::new(Some(outcome)) }
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self, _endpoint: &Url) -> Result<Box<dyn FrameTransport>> {
        let outcome = self.outcome.lock().unwrap().take();
        match outcome {
            Some(ConnectOutcome::Ready(transport)) => Ok(Box::new(transport)),
            Some(ConnectOutcome::Fail(reason)) => Err(ChatError::Transport(reason)),
            Some(ConnectOutcome::Hang) => std::future::pending().await,
            None => Err(ChatError::Transport("already connected".to_string())),
        }
    }
}

/// Pages served from memory. A gate, when set, holds every fetch until released.
#[derive(Default)]
pub struct MemoryPages {
    pages: HashMap<String, String>,
    gate: Option<Arc<Notify>>,
}

impl MemoryPages {
    pub fn with_page(mut self, id: &str, content: &str) -> Self {
        self.pages.insert(id.to_string(), content.to_string());
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl PageSource for MemoryPages {
    async fn fetch_page(&self, page_id: &str) -> Result<String> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.pages
            .get(page_id)
            .cloned()
            .ok_or_else(|| ChatError::NotFound(format!("page {}", page_id)))
    }
}

pub fn endpoint() -> Url {
    Url::parse("ws://127.0.0.1:9/api/v1/chat/ws?user_id=u1").unwrap()
}

pub fn start_session(pages: MemoryPages) -> (ChatSession, FakeServer) {
    let (transport, server) = channel_pair();
    let connector = ChannelConnector::new(ConnectOutcome::Ready(transport));
    let session = ChatSession::connect_with(Arc::new(connector), Arc::new(pages), endpoint());
    (session, server)
}

/// A session that is Open with the `Connected` notice already consumed.
pub async fn open_session(pages: MemoryPages) -> (ChatSession, FakeServer) {
    let (mut session, server) = start_session(pages);
    assert_eq!(next_notice(&mut session).await, Notification::Connected);
    wait_until(&session, |s| s.is_open()).await;
    (session, server)
}

pub async fn wait_until<F>(session: &ChatSession, pred: F) -> SessionState
where
    F: Fn(&SessionState) -> bool,
{
    let mut rx = session.watch();
    tokio::time::timeout(WAIT, async {
        loop {
            {
                let state = rx.borrow_and_update();
                if pred(&state) {
                    return state.clone();
                }
            }
            rx.changed().await.expect("session ended while waiting");
        }
    })
    .await
    .expect("timed out waiting for session state")
}

pub async fn next_notice(session: &mut ChatSession) -> Notification {
    tokio::time::timeout(WAIT, session.next_notification())
        .await
        .expect("timed out waiting for a notification")
        .expect("session ended before a notification")
}
