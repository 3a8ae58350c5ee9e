//! Conversation history display component

use crate::model::{Message, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Renders the transcript as chat bubbles, bottom-anchored.
///
/// User messages sit on the right, interviewer messages on the left,
/// mirroring insertion order. The controller owns the message list; this
/// widget only borrows it for a frame.
pub struct ConversationHistory<'a> {
    messages: &'a [Message],
}

impl<'a> ConversationHistory<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Self { messages }
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title("Interview");

        let inner = block.inner(area);
        block.render(area, buf);

        if self.messages.is_empty() {
            render_welcome(inner, buf);
            return;
        }

        // Bubbles cap at two thirds of the pane, like the page layout the
        // transcript came from.
        let bubble_width = ((inner.width as usize * 2) / 3).max(16);

        let mut all_lines: Vec<(Line, Sender)> = Vec::new();
        for message in self.messages {
            for text in wrap_text(&message.text, bubble_width) {
                let styled = match message.sender {
                    Sender::User => Span::styled(text, Style::default().fg(Color::Magenta)),
                    Sender::Bot => Span::styled(text, Style::default().fg(Color::Green)),
                };
                all_lines.push((Line::from(vec![styled]), message.sender));
            }
            all_lines.push((Line::default(), message.sender));
        }

        // Show the tail that fits, newest at the bottom.
        let height = inner.height as usize;
        let start = all_lines.len().saturating_sub(height);

        for (row, (line, sender)) in all_lines[start..].iter().enumerate() {
            let line_width = line.width() as u16;
            let x = match sender {
                Sender::User => inner.x + inner.width.saturating_sub(line_width),
                Sender::Bot => inner.x,
            };
            buf.set_line(x, inner.y + row as u16, line, inner.width);
        }
    }
}

fn render_welcome(inner: Rect, buf: &mut Buffer) {
    let welcome_lines = vec![
        Line::from(vec![Span::styled(
            "Welcome to your practice interview",
            Style::default().fg(Color::Green),
        )]),
        Line::from(vec![Span::raw("")]),
        Line::from(vec![Span::styled(
            "The interviewer opens with: Tell me about yourself",
            Style::default().fg(Color::Gray),
        )]),
        Line::from(vec![Span::styled(
            "Type your answer below and press Enter.",
            Style::default().fg(Color::DarkGray),
        )]),
    ];

    for (i, line) in welcome_lines.iter().enumerate() {
        if i < inner.height as usize {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}

/// Wrap text to fit within the given width
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current_line = String::new();

        for word in raw_line.split_whitespace() {
            if current_line.chars().count() + word.chars().count() + 1 <= width {
                if !current_line.is_empty() {
                    current_line.push(' ');
                }
                current_line.push_str(word);
            } else {
                if !current_line.is_empty() {
                    lines.push(current_line);
                    current_line = String::new();
                }
                current_line.push_str(word);
            }
        }

        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
