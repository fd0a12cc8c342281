use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::ui::Theme;

/// Bordered hotkey bar at the bottom of the screen
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str, Style)>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self { hints: Vec::new() }
    }

    /// Add a keyboard hint with the style of its key
    pub fn hint(mut self, key: &'a str, desc: &'a str, key_style: Style) -> Self {
        self.hints.push((key, desc, key_style));
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Hotkeys ", Theme::title()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = Vec::new();
        for (i, (key, desc, style)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("   ", Theme::status_bar()));
            }
            spans.push(Span::styled(*key, *style));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        buf.set_line(inner.x, inner.y, &Line::from(spans), inner.width);
    }
}

/// The hotkey bar of the log screen; the F6 key shows the auto-scroll state
pub fn hotkey_bar<'a>(auto_scroll: bool) -> StatusBar<'a> {
    StatusBar::new()
        .hint("Esc/Q", "Quit", Theme::status_bar_quit_key())
        .hint("F1", "Help", Theme::status_bar_key())
        .hint("F3", "Focus Filter", Theme::status_bar_key())
        .hint("F4", "Clear Filter", Theme::status_bar_key())
        .hint("F5", "Clear", Theme::status_bar_key())
        .hint("F6", "AutoScroll", Theme::toggle_key(auto_scroll))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_to_string(bar: StatusBar, width: u16) -> String {
        let area = Rect::new(0, 0, width, 3);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        (0..width)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_hotkeys_rendered() {
        let text = render_to_string(hotkey_bar(false), 120);
        assert!(text.contains("F1 Help"));
        assert!(text.contains("F6 AutoScroll"));
    }

    #[test]
    fn test_autoscroll_key_color() {
        let area = Rect::new(0, 0, 120, 3);
        let mut buf = Buffer::empty(area);
        hotkey_bar(true).render(area, &mut buf);
        let line: String = (0..120).map(|x| buf[(x, 1)].symbol().to_string()).collect();
        let f6 = line[..line.find("F6").unwrap()].chars().count() as u16;
        assert_eq!(buf[(f6, 1)].fg, Theme::SUCCESS);
    }

    #[test]
    fn test_hints_clipped_to_inner_width() {
        let text = render_to_string(StatusBar::new().hint("F1", "Help", Style::default()), 6);
        assert_eq!(text, "│F1 H│");
    }
}
