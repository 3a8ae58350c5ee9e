//! Decorative gradient text widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

const PALETTE: [Color; 6] = [
    Color::Magenta,
    Color::LightMagenta,
    Color::LightBlue,
    Color::Cyan,
    Color::LightCyan,
    Color::Blue,
];

/// Text painted with a color gradient that shifts with the animation tick.
///
/// Purely presentational: no state, no side effects. Accepts a base style
/// override for everything but the foreground color.
pub struct GradientText<'a> {
    text: &'a str,
    tick: u64,
    style: Style,
}

impl<'a> GradientText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            tick: 0,
            style: Style::default(),
        }
    }

    /// Advance the gradient phase; callers pass the app animation tick.
    pub fn tick(mut self, tick: u64) -> Self {
        self.tick = tick;
        self
    }

    #[allow(dead_code)]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

fn color_at(index: usize, tick: u64) -> Color {
    PALETTE[(index + tick as usize) % PALETTE.len()]
}

impl Widget for GradientText<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .text
            .chars()
            .enumerate()
            .map(|(i, ch)| Span::styled(ch.to_string(), self.style.fg(color_at(i, self.tick))))
            .collect();

        let line = Line::from(spans);
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
