//! Busy indicator shown while a completion request is in flight

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Animated "Thinking..." bubble, the terminal stand-in for the loader
/// bubble the interviewer shows while it waits for feedback.
pub struct ThinkingIndicator {
    tick: u64,
}

impl ThinkingIndicator {
    pub fn new(tick: u64) -> Self {
        Self { tick }
    }

    fn dots(&self) -> &'static str {
        match self.tick % 4 {
            0 => ".",
            1 => "..",
            2 => "...",
            _ => "   ",
        }
    }
}

impl Widget for ThinkingIndicator {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line = Line::from(vec![
            Span::styled("Thinking", Style::default().fg(Color::Green)),
            Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
        ]);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
