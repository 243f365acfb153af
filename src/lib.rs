pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod session;
pub mod transport;
pub mod util;

pub mod app;
pub mod event;
pub mod ui;

pub use config::ClientConfig;
pub use error::{ChatError, Result};
pub use session::ChatSession;
