// src/session/mod.rs
//! Streaming chat session: wire frames, the pure state machine, and the
//! actor that drives it over a transport.

mod actor;
pub mod frames;
mod handle;
pub mod state;
pub mod types;

pub use frames::{ClientFrame, ServerFrame};
pub use handle::ChatSession;
pub use state::{SessionEvent, SessionIntent, SessionState, SessionStateMachine};
pub use types::{
    ConnectionStatus, InputEdit, Message, Notification, RetrievedChunk, Role, Severity,
    SidePanelTab, UserId,
};
