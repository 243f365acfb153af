// src/session/actor.rs
//! The session's single dispatch queue. User intents, inbound frames and
//! page fetch completions are applied one at a time, each to completion.

use std::collections::VecDeque;
use std::sync::Arc;
use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;

use super::frames::{ClientFrame, ServerFrame};
use super::state::{SessionEvent, SessionIntent, SessionState, SessionStateMachine};
use super::types::Notification;
use crate::backend::PageSource;
use crate::error::{ChatError, Result};
use crate::transport::{Connector, FrameTransport};
use crate::{log_debug, log_error, log_info, log_warn};

pub struct SessionActor {
    state: SessionState,
    endpoint: Url,
    connector: Arc<dyn Connector>,
    pages: Arc<dyn PageSource>,
    transport: Option<Box<dyn FrameTransport>>,
    fetches: JoinSet<SessionIntent>,
    intent_rx: mpsc::UnboundedReceiver<SessionIntent>,
    state_tx: watch::Sender<SessionState>,
    notice_tx: mpsc::UnboundedSender<Notification>,
}

impl SessionActor {
    pub fn new(
        endpoint: Url,
        connector: Arc<dyn Connector>,
        pages: Arc<dyn PageSource>,
        intent_rx: mpsc::UnboundedReceiver<SessionIntent>,
        state_tx: watch::Sender<SessionState>,
        notice_tx: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        Self {
            state: SessionState::default(),
            endpoint,
            connector,
            pages,
            transport: None,
            fetches: JoinSet::new(),
            intent_rx,
            state_tx,
            notice_tx,
        }
    }

    pub async fn run(mut self) {
        if !self.connect().await {
            self.shutdown();
            return;
        }

        while !self.state.disposed {
            tokio::select! {
                intent = self.intent_rx.recv() => match intent {
                    Some(intent) => self.process_intent(intent).await,
                    // Every handle is gone.
                    None => self.process_intent(SessionIntent::Dispose).await,
                },
                inbound = Self::next_inbound(&mut self.transport) => {
                    let intent = self.inbound_to_intent(inbound);
                    if let Some(intent) = intent {
                        self.process_intent(intent).await;
                    }
                },
                Some(done) = self.fetches.join_next(), if !self.fetches.is_empty() => match done {
                    Ok(intent) => self.process_intent(intent).await,
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => log_error!("Page fetch task failed: {}", e),
                },
            }
        }

        self.shutdown();
    }

    /// Connecting phase. Intents keep flowing so a dispose during the
    /// handshake is honoured. Returns false once the session is over.
    async fn connect(&mut self) -> bool {
        let connector = Arc::clone(&self.connector);
        let endpoint = self.endpoint.clone();
        let connecting = connector.connect(&endpoint);
        tokio::pin!(connecting);

        loop {
            tokio::select! {
                result = &mut connecting => {
                    match result {
                        Ok(transport) => {
                            self.transport = Some(transport);
                            self.process_intent(SessionIntent::ConnectionOpened).await;
                        }
                        Err(e) => {
                            log_error!("Chat connection failed: {}", e);
                            self.process_intent(SessionIntent::ConnectionFailed(e.to_string())).await;
                        }
                    }
                    return !self.state.disposed;
                }
                intent = self.intent_rx.recv() => {
                    let intent = intent.unwrap_or(SessionIntent::Dispose);
                    self.process_intent(intent).await;
                    if self.state.disposed {
                        return false;
                    }
                }
            }
        }
    }

    async fn next_inbound(transport: &mut Option<Box<dyn FrameTransport>>) -> Option<Result<String>> {
        match transport {
            Some(transport) => transport.recv_text().await,
            None => std::future::pending().await,
        }
    }

    fn inbound_to_intent(&mut self, inbound: Option<Result<String>>) -> Option<SessionIntent> {
        match inbound {
            Some(Ok(text)) => match ServerFrame::decode(&text) {
                Ok(frame) => {
                    log_debug!("<- {}", frame.kind());
                    Some(SessionIntent::FrameReceived(frame))
                }
                Err(e) => {
                    log_warn!("Ignoring undecodable frame ({}): {}", e, text);
                    None
                }
            },
            Some(Err(e)) => {
                self.transport = None;
                Some(SessionIntent::ConnectionFailed(e.to_string()))
            }
            None => {
                self.transport = None;
                Some(SessionIntent::ConnectionClosed)
            }
        }
    }

    async fn process_intent(&mut self, intent: SessionIntent) {
        let mut pending = VecDeque::from([intent]);

        while let Some(intent) = pending.pop_front() {
            // Pure state transition
            let state = std::mem::take(&mut self.state);
            let (new_state, events) = SessionStateMachine::transition(state, intent);
            self.state = new_state;

            // Observers see the new state before any side effect runs
            self.state_tx.send_replace(self.state.clone());

            for event in events {
                if let Some(follow_up) = self.handle_side_effect(event).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    /// Runs one side effect. A failed write comes back as a follow-up intent.
    async fn handle_side_effect(&mut self, event: SessionEvent) -> Option<SessionIntent> {
        match event {
            SessionEvent::Outbound(frame) => self.send_frame(frame).await,
            SessionEvent::Notify(notice) => {
                log_info!("Notice: {}", notice);
                let _ = self.notice_tx.send(notice);
                None
            }
            SessionEvent::FetchPage(page_id) => {
                let pages = Arc::clone(&self.pages);
                self.fetches.spawn(async move {
                    match pages.fetch_page(&page_id).await {
                        Ok(content) => SessionIntent::PageLoaded(content),
                        Err(e) => SessionIntent::PageFailed(e.to_string()),
                    }
                });
                None
            }
            SessionEvent::CloseConnection => {
                if let Some(mut transport) = self.transport.take() {
                    if let Err(e) = transport.close().await {
                        log_warn!("Error while closing chat socket: {}", e);
                    }
                }
                None
            }
        }
    }

    async fn send_frame(&mut self, frame: ClientFrame) -> Option<SessionIntent> {
        let Some(transport) = self.transport.as_mut() else {
            return None;
        };

        let result = match frame.encode() {
            Ok(text) => transport.send_text(text).await,
            Err(e) => Err(ChatError::from(e)),
        };

        match result {
            Ok(()) => None,
            Err(e) => {
                log_error!("Failed to send frame: {}", e);
                self.transport = None;
                Some(SessionIntent::ConnectionFailed(e.to_string()))
            }
        }
    }

    /// Nothing can reach observers once this returns.
    fn shutdown(&mut self) {
        self.fetches.abort_all();
        self.transport = None;
        self.intent_rx.close();
        log_info!("Chat session finished");
    }
}
