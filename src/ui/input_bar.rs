// src/ui/input_bar.rs
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph, Widget},
};

use crate::app::App;
use crate::session::ConnectionStatus;
use crate::ui::style::{connection_badge, dim_unless_focused, severity_color};

pub fn render_input(app: &App, area: Rect, buf: &mut Buffer) {
    let enabled = app.input_enabled();
    let title = match app.state.connection {
        ConnectionStatus::Connecting => " Connecting... ",
        ConnectionStatus::Closed => " Disconnected ",
        ConnectionStatus::Open if app.state.is_streaming => " Answering (Esc to stop) ",
        ConnectionStatus::Open => " Message (Enter to send, Ctrl+C to quit) ",
    };

    Paragraph::new(format!("> {}", app.state.input))
        .block(Block::bordered().title(title).border_type(BorderType::Rounded))
        .style(dim_unless_focused(enabled, Style::default().fg(Color::Yellow)))
        .render(area, buf);
}

pub fn render_status_line(app: &App, area: Rect, buf: &mut Buffer) {
    let (badge, badge_color) = connection_badge(app.state.connection);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(badge.chars().count() as u16 + 1)])
        .split(area);

    if let Some((notice, _)) = &app.notice {
        Paragraph::new(Line::from(Span::styled(
            format!(" {}", notice),
            Style::default().fg(severity_color(notice.severity())),
        )))
        .render(columns[0], buf);
    }

    Paragraph::new(badge)
        .fg(badge_color)
        .alignment(Alignment::Right)
        .render(columns[1], buf);
}
