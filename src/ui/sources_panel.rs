// src/ui/sources_panel.rs
//! Side panel with the retrieved chunks and the full text of an opened page.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Tabs, Widget, Wrap},
};

use crate::app::App;
use crate::session::{RetrievedChunk, SidePanelTab};

/// Excerpts longer than this are cut in the list view.
const EXCERPT_CHARS: usize = 240;

pub fn render_sources_panel(app: &App, area: Rect, buf: &mut Buffer) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let tabs = [SidePanelTab::Chunks, SidePanelTab::Page];
    let selected = tabs.iter().position(|t| *t == app.state.active_tab).unwrap_or(0);
    Tabs::new(tabs.iter().map(|t| t.title()))
        .block(
            Block::bordered()
                .title(" Sources (Tab) ")
                .border_type(BorderType::Rounded),
        )
        .select(selected)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .render(layout[0], buf);

    match app.state.active_tab {
        SidePanelTab::Chunks => render_chunks(&app.state.chunks, app.selected_source, layout[1], buf),
        SidePanelTab::Page => render_page(app.state.page_content.as_deref(), layout[1], buf),
    }
}

fn render_chunks(chunks: &[RetrievedChunk], selected: Option<usize>, area: Rect, buf: &mut Buffer) {
    let content = if chunks.is_empty() {
        Text::from("No sources retrieved yet").fg(Color::DarkGray)
    } else {
        Text::from(format_chunks(chunks, selected))
    };

    Paragraph::new(content)
        .block(
            Block::bordered()
                .title(" Ctrl+↑↓ select • Ctrl+O open page ")
                .border_type(BorderType::Rounded),
        )
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn format_chunks(chunks: &[RetrievedChunk], selected: Option<usize>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let is_selected = selected == Some(i);
        let title_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
        };
        let title = if chunk.source_title.is_empty() { "Untitled" } else { chunk.source_title.as_str() };

        lines.push(Line::from(vec![
            Span::styled(if is_selected { "> " } else { "  " }, title_style),
            Span::styled(title.to_string(), title_style),
            Span::styled(format!("  {}", chunk.relevance_label()), Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate(&chunk.excerpt, EXCERPT_CHARS)),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
    }
    lines
}

fn render_page(content: Option<&str>, area: Rect, buf: &mut Buffer) {
    let text = match content {
        Some(content) => Text::from(content.to_string()),
        None => Text::from("Select a chunk and press Ctrl+O to load its page").fg(Color::DarkGray),
    };

    Paragraph::new(text)
        .block(Block::bordered().title(" Page ").border_type(BorderType::Rounded))
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn truncate(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &flat[..cut]),
        None => flat,
    }
}
