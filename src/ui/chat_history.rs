// src/ui/chat_history.rs
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::session::{Message, Role};
use crate::ui::style::role_style;

const SPINNER: [&str; 4] = ["·  ", "·· ", "···", " ··"];

pub fn render_chat_history(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(" Conversation (PgUp/PgDn to scroll) ")
        .border_type(BorderType::Rounded);
    let inner = block.inner(area);

    let content = if app.state.messages.is_empty() {
        Text::from(vec![
            Line::from("Ask anything about your connected Notion workspace."),
            Line::from(""),
            Line::from("Sources used for each answer appear in the side panel."),
        ])
        .style(Style::default().fg(Color::DarkGray))
    } else {
        let spinner = SPINNER[(app.ticks % SPINNER.len() as u64) as usize];
        Text::from(format_messages(&app.state.messages, app.state.is_streaming, spinner))
    };

    let total = wrapped_height(&content, inner.width);
    let top = total
        .saturating_sub(inner.height)
        .saturating_sub(app.scroll_back);

    Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((top, 0))
        .render(area, buf);
}

fn format_messages(messages: &[Message], is_streaming: bool, spinner: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let last = messages.len().saturating_sub(1);

    for (i, msg) in messages.iter().enumerate() {
        let prefix = match msg.role {
            Role::User => "You: ",
            Role::Assistant => "Assistant: ",
        };

        let streaming_here = is_streaming && i == last && msg.role == Role::Assistant;
        let mut content_lines = msg.content.lines();
        let first = content_lines.next().unwrap_or_default().to_string();

        let mut head = vec![
            Span::styled(prefix, role_style(msg.role)),
            Span::styled(first, Style::default().fg(Color::White)),
        ];
        if streaming_here && msg.content.is_empty() {
            head.push(Span::styled(spinner.to_string(), Style::default().fg(Color::DarkGray)));
        }
        lines.push(Line::from(head));

        for line in content_lines {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(line.to_string(), Style::default().fg(Color::White)),
            ]));
        }
        lines.push(Line::from(""));
    }
    lines
}

/// Rows the text occupies once wrapped to `width` columns.
fn wrapped_height(text: &Text, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let rows: usize = text
        .lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    rows.min(u16::MAX as usize) as u16
}
