// src/session/state/mod.rs
mod handle_connection;
mod handle_frame;
mod handle_input;
mod handle_page;

use serde::Serialize;

use super::frames::{ClientFrame, ServerFrame};
use super::types::{
    ConnectionStatus, InputEdit, Message, Notification, RetrievedChunk, Role, SidePanelTab,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub connection: ConnectionStatus,
    pub conversation_id: Option<String>,
    pub active_stream_id: Option<String>,
    pub is_streaming: bool,
    pub messages: Vec<Message>,
    pub chunks: Vec<RetrievedChunk>,
    pub page_content: Option<String>,
    pub active_tab: SidePanelTab,
    pub input: String,
    pub disposed: bool,
    /// Accumulates `stream` payloads for the active answer.
    #[serde(skip)]
    stream_buffer: String,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        self.connection == ConnectionStatus::Open
    }

    /// Mirrors the preconditions of `Send`, minus the text check.
    pub fn can_send(&self) -> bool {
        !self.disposed && self.is_open() && !self.is_streaming
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Replace the last assistant message's content with the buffer.
    fn publish_stream_buffer(&mut self) {
        if let Some(last) = self.messages.last_mut() {
            if last.role == Role::Assistant {
                last.content = self.stream_buffer.clone();
            }
        }
    }

    fn finish_stream(&mut self) {
        self.is_streaming = false;
        self.active_stream_id = None;
    }
}

// ----------------------------------------------------------------------------
// INTENT - everything that can change a session, in arrival order
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SessionIntent {
    ConnectionOpened,
    ConnectionClosed,
    ConnectionFailed(String),
    FrameReceived(ServerFrame),
    Send(String),
    Submit,
    Stop,
    EditInput(InputEdit),
    ViewPage(String),
    PageLoaded(String),
    PageFailed(String),
    SelectTab(SidePanelTab),
    Dispose,
}

// ----------------------------------------------------------------------------
// EVENTS - side effects a transition asks the actor to perform
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Outbound(ClientFrame),
    Notify(Notification),
    FetchPage(String),
    CloseConnection,
}

// ----------------------------------------------------------------------------
// STATE MACHINE - Pure function: (State, Intent) -> (State, Vec<Event>)
// ----------------------------------------------------------------------------

pub struct SessionStateMachine;

impl SessionStateMachine {
    pub fn transition(
        state: SessionState,
        intent: SessionIntent,
    ) -> (SessionState, Vec<SessionEvent>) {
        use SessionIntent::*;

        if state.disposed {
            return (state, vec![]);
        }

        match intent {
            ConnectionOpened => Self::handle_opened(state),
            ConnectionClosed => Self::handle_closed(state, Notification::Disconnected),
            ConnectionFailed(reason) => {
                Self::handle_closed(state, Notification::ConnectionError(reason))
            }
            FrameReceived(frame) => Self::handle_frame(state, frame),
            Send(text) => Self::handle_send(state, text),
            Submit => {
                let text = state.input.clone();
                Self::handle_send(state, text)
            }
            Stop => Self::handle_stop(state),
            EditInput(edit) => Self::handle_edit_input(state, edit),
            ViewPage(page_id) => Self::handle_view_page(state, page_id),
            PageLoaded(content) => Self::handle_page_loaded(state, content),
            PageFailed(reason) => Self::handle_page_failed(state, reason),
            SelectTab(tab) => Self::handle_select_tab(state, tab),
            Dispose => Self::handle_dispose(state),
        }
    }
}
