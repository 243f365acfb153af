// src/session/handle.rs
//! Public face of a chat session. Owns the actor task; everything else is
//! a channel into it or a view of the state it publishes.

use std::sync::Arc;
use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::actor::SessionActor;
use super::state::{SessionIntent, SessionState};
use super::types::{InputEdit, Notification, SidePanelTab, UserId};
use crate::backend::{BackendClient, PageSource};
use crate::config::ClientConfig;
use crate::error::{ChatError, Result};
use crate::log_debug;
use crate::transport::{Connector, WsConnector};

pub struct ChatSession {
    intent_tx: mpsc::UnboundedSender<SessionIntent>,
    state_rx: watch::Receiver<SessionState>,
    notice_rx: mpsc::UnboundedReceiver<Notification>,
    task: Option<JoinHandle<()>>,
}

impl ChatSession {
    /// Opens a session against the configured backend. The handshake runs in
    /// the background; watch `state().connection` for the outcome.
    pub fn connect(config: &ClientConfig, user_id: &UserId) -> Result<Self> {
        let endpoint = config.websocket_endpoint(user_id)?;
        let pages = BackendClient::from_config(config)?;
        Ok(Self::connect_with(Arc::new(WsConnector), Arc::new(pages), endpoint))
    }

    /// Must be called from within a tokio runtime.
    pub fn connect_with(
        connector: Arc<dyn Connector>,
        pages: Arc<dyn PageSource>,
        endpoint: Url,
    ) -> Self {
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::default());
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let actor = SessionActor::new(endpoint, connector, pages, intent_rx, state_tx, notice_tx);
        let task = tokio::spawn(actor.run());

        Self {
            intent_tx,
            state_rx,
            notice_rx,
            task: Some(task),
        }
    }

    fn dispatch(&self, intent: SessionIntent) -> Result<()> {
        self.intent_tx
            .send(intent)
            .map_err(|_| ChatError::SessionClosed)
    }

    /// Sends `text` as a new user message. Ignored unless the session can send.
    pub fn send(&self, text: impl Into<String>) -> Result<()> {
        self.dispatch(SessionIntent::Send(text.into()))
    }

    /// Sends the current input buffer.
    pub fn submit(&self) -> Result<()> {
        self.dispatch(SessionIntent::Submit)
    }

    pub fn stop(&self) -> Result<()> {
        self.dispatch(SessionIntent::Stop)
    }

    pub fn edit_input(&self, edit: InputEdit) -> Result<()> {
        self.dispatch(SessionIntent::EditInput(edit))
    }

    pub fn view_page(&self, page_id: impl Into<String>) -> Result<()> {
        self.dispatch(SessionIntent::ViewPage(page_id.into()))
    }

    pub fn select_tab(&self, tab: SidePanelTab) -> Result<()> {
        self.dispatch(SessionIntent::SelectTab(tab))
    }

    /// Snapshot of the latest published state.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// A fresh receiver for observers that want their own change stream.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Waits until the state changes. Errors once the session has finished.
    pub async fn changed(&mut self) -> Result<()> {
        self.state_rx
            .changed()
            .await
            .map_err(|_| ChatError::SessionClosed)
    }

    /// Next notification, or `None` once the session has finished.
    pub async fn next_notification(&mut self) -> Option<Notification> {
        self.notice_rx.recv().await
    }

    pub fn try_notification(&mut self) -> Option<Notification> {
        self.notice_rx.try_recv().ok()
    }

    pub fn is_disposed(&self) -> bool {
        self.task.is_none() || self.state_rx.borrow().disposed
    }

    /// Closes the connection and waits for the session task to finish. No
    /// state change or notification is published after this returns.
    pub async fn dispose(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        let _ = self.intent_tx.send(SessionIntent::Dispose);
        if let Err(e) = task.await {
            log_debug!("Session task ended abnormally: {}", e);
        }

        // Drop whatever was queued before the task finished.
        while self.notice_rx.try_recv().is_ok() {}
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        if self.task.is_some() {
            let _ = self.intent_tx.send(SessionIntent::Dispose);
        }
    }
}
