use super::{SessionEvent, SessionState, SessionStateMachine};
use crate::session::frames::{ClientFrame, ServerFrame};
use crate::session::types::{Message, Notification, RetrievedChunk};
use crate::{log_debug, log_warn};

const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

impl SessionStateMachine {
    pub(super) fn handle_frame(
        state: SessionState,
        frame: ServerFrame,
    ) -> (SessionState, Vec<SessionEvent>) {
        if !state.is_open() {
            log_debug!("Dropping '{}' frame, connection is {:?}", frame.kind(), state.connection);
            return (state, vec![]);
        }

        match frame {
            ServerFrame::Ping => (state, vec![SessionEvent::Outbound(ClientFrame::Pong)]),
            ServerFrame::ConversationId { data } => Self::handle_conversation_id(state, data),
            ServerFrame::StreamStart { message_id } => Self::handle_stream_start(state, message_id),
            ServerFrame::Chunks { data } => Self::handle_chunks(state, data.unwrap_or_default()),
            ServerFrame::Stream { content } => Self::handle_stream(state, content),
            ServerFrame::Complete => Self::handle_complete(state, None),
            ServerFrame::GenerationStopped => {
                Self::handle_complete(state, Some(Notification::GenerationStopped))
            }
            ServerFrame::Error { message } => Self::handle_error(state, message),
            ServerFrame::IdleTimeout => {
                (state, vec![SessionEvent::Notify(Notification::IdleTimeout)])
            }
            ServerFrame::Unknown => (state, vec![]),
        }
    }

    fn handle_conversation_id(
        mut state: SessionState,
        conversation_id: String,
    ) -> (SessionState, Vec<SessionEvent>) {
        if let Some(previous) = &state.conversation_id {
            if previous != &conversation_id {
                log_warn!("Conversation id replaced: {} -> {}", previous, conversation_id);
            }
        }
        state.conversation_id = Some(conversation_id);
        (state, vec![])
    }

    fn handle_stream_start(
        mut state: SessionState,
        message_id: String,
    ) -> (SessionState, Vec<SessionEvent>) {
        if let Some(active) = &state.active_stream_id {
            log_warn!("stream_start for {} while {} is active; finalizing the previous answer", message_id, active);
        }

        state.messages.push(Message::assistant(message_id.clone()));
        state.active_stream_id = Some(message_id);
        state.is_streaming = true;
        state.stream_buffer.clear();
        (state, vec![])
    }

    /// Wholesale replacement, never merged with the previous turn.
    fn handle_chunks(
        mut state: SessionState,
        chunks: Vec<RetrievedChunk>,
    ) -> (SessionState, Vec<SessionEvent>) {
        state.chunks = chunks;
        (state, vec![])
    }

    fn handle_stream(mut state: SessionState, content: String) -> (SessionState, Vec<SessionEvent>) {
        if !state.is_streaming {
            log_debug!("Ignoring stream payload outside of an active answer");
            return (state, vec![]);
        }

        state.stream_buffer.push_str(&content);
        state.publish_stream_buffer();
        (state, vec![])
    }

    fn handle_complete(
        mut state: SessionState,
        notice: Option<Notification>,
    ) -> (SessionState, Vec<SessionEvent>) {
        if !state.is_streaming {
            return (state, vec![]);
        }

        state.finish_stream();
        let events = notice.map(SessionEvent::Notify).into_iter().collect();
        (state, events)
    }

    /// Clears the active stream id along with the streaming flag.
    fn handle_error(
        mut state: SessionState,
        message: Option<String>,
    ) -> (SessionState, Vec<SessionEvent>) {
        let message = message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

        state.finish_stream();
        (state, vec![SessionEvent::Notify(Notification::ServerError(message))])
    }
}
