// src/ui/mod.rs
pub mod chat_history;
pub mod input_bar;
pub mod sources_panel;
pub mod style;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

use crate::app::App;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),     // Conversation + side panel
                Constraint::Length(3),  // Input box
                Constraint::Length(1),  // Status line
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(rows[0]);

        chat_history::render_chat_history(self, columns[0], buf);
        sources_panel::render_sources_panel(self, columns[1], buf);
        input_bar::render_input(self, rows[1], buf);
        input_bar::render_status_line(self, rows[2], buf);
    }
}
