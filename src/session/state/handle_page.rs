use super::{SessionEvent, SessionState, SessionStateMachine};
use crate::session::types::{Notification, SidePanelTab};
use crate::log_warn;

impl SessionStateMachine {
    pub(super) fn handle_view_page(state: SessionState, page_id: String) -> (SessionState, Vec<SessionEvent>) {
        if page_id.trim().is_empty() {
            return (state, vec![]);
        }
        (state, vec![SessionEvent::FetchPage(page_id)])
    }

    pub(super) fn handle_page_loaded(
        mut state: SessionState,
        content: String,
    ) -> (SessionState, Vec<SessionEvent>) {
        state.page_content = Some(content);
        state.active_tab = SidePanelTab::Page;
        (state, vec![])
    }

    /// Displayed content and tab are left exactly as they were.
    pub(super) fn handle_page_failed(
        state: SessionState,
        reason: String,
    ) -> (SessionState, Vec<SessionEvent>) {
        log_warn!("Page fetch failed: {}", reason);
        (state, vec![SessionEvent::Notify(Notification::PageLoadFailed)])
    }

    pub(super) fn handle_select_tab(
        mut state: SessionState,
        tab: SidePanelTab,
    ) -> (SessionState, Vec<SessionEvent>) {
        state.active_tab = tab;
        (state, vec![])
    }
}
