use super::{SessionEvent, SessionState, SessionStateMachine};
use crate::session::types::{ConnectionStatus, Notification};

impl SessionStateMachine {
    pub(super) fn handle_opened(mut state: SessionState) -> (SessionState, Vec<SessionEvent>) {
        if state.connection != ConnectionStatus::Connecting {
            return (state, vec![]);
        }

        state.connection = ConnectionStatus::Open;
        (state, vec![SessionEvent::Notify(Notification::Connected)])
    }

    /// Closed is terminal. Partial content of an interrupted answer stays.
    pub(super) fn handle_closed(
        mut state: SessionState,
        notice: Notification,
    ) -> (SessionState, Vec<SessionEvent>) {
        if state.connection == ConnectionStatus::Closed {
            return (state, vec![]);
        }

        state.connection = ConnectionStatus::Closed;
        state.finish_stream();
        (state, vec![SessionEvent::Notify(notice)])
    }

    pub(super) fn handle_dispose(mut state: SessionState) -> (SessionState, Vec<SessionEvent>) {
        let was_open = state.is_open();

        state.disposed = true;
        state.connection = ConnectionStatus::Closed;
        state.finish_stream();

        let events = if was_open {
            vec![SessionEvent::CloseConnection]
        } else {
            vec![]
        };
        (state, events)
    }
}
