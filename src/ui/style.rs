// src/ui/style.rs
use ratatui::style::{Color, Modifier, Style, Stylize};

use crate::session::{ConnectionStatus, Role, Severity};

pub fn dim_unless_focused(is_focused: bool, style: Style) -> Style {
    if is_focused { style.bold() } else { style.dim().italic() }
}

pub fn role_style(role: Role) -> Style {
    let color = match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Green,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Info => Color::Blue,
        Severity::Error => Color::Red,
    }
}

pub fn connection_badge(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connecting => ("● connecting", Color::Yellow),
        ConnectionStatus::Open => ("● connected", Color::Green),
        ConnectionStatus::Closed => ("● disconnected", Color::Red),
    }
}
