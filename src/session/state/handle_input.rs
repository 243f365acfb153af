use super::{SessionEvent, SessionState, SessionStateMachine};
use crate::session::frames::ClientFrame;
use crate::session::types::{InputEdit, Message};

impl SessionStateMachine {
    /// Preconditions that fail make this a silent no-op.
    pub(super) fn handle_send(mut state: SessionState, text: String) -> (SessionState, Vec<SessionEvent>) {
        let text = text.trim();
        if text.is_empty() || !state.can_send() {
            return (state, vec![]);
        }

        let text = text.to_string();
        state.messages.push(Message::user(text.clone()));
        state.input.clear();

        let frame = ClientFrame::Chat {
            message: text,
            conversation_id: state.conversation_id.clone(),
        };
        (state, vec![SessionEvent::Outbound(frame)])
    }

    pub(super) fn handle_stop(state: SessionState) -> (SessionState, Vec<SessionEvent>) {
        if !state.is_open() {
            return (state, vec![]);
        }

        let events = match &state.active_stream_id {
            Some(message_id) => vec![SessionEvent::Outbound(ClientFrame::StopGeneration {
                message_id: message_id.clone(),
            })],
            None => vec![],
        };
        (state, events)
    }

    pub(super) fn handle_edit_input(
        mut state: SessionState,
        edit: InputEdit,
    ) -> (SessionState, Vec<SessionEvent>) {
        match edit {
            InputEdit::Insert(ch) => state.input.push(ch),
            InputEdit::Backspace => {
                state.input.pop();
            }
            InputEdit::Clear => state.input.clear(),
            InputEdit::Replace(text) => state.input = text,
        }
        (state, vec![])
    }
}
