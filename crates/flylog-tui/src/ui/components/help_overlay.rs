use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::Mode;
use crate::ui::{Layout, Theme};

/// Help overlay showing keybindings and the current mode
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame, mode: &Mode) {
        let popup_area = Layout::centered(frame.area(), 60, 22);

        // Clear the background
        frame.render_widget(Clear, popup_area);

        let mut help_text = vec![
            Line::from(Span::styled(
                "Hotkeys",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Self::key_line("Esc/q", "Quit (table) / leave the filter input"),
            Self::key_line("F1", "Toggle this help"),
            Self::key_line("F3 or /", "Focus filter input"),
            Self::key_line("Enter", "Apply filter now"),
            Self::key_line("Ctrl+u", "Clear filter input"),
            Self::key_line("F4", "Clear filter"),
            Self::key_line("F5", "Clear all logs"),
            Self::key_line("F6", "Toggle auto-scroll"),
            Self::key_line("↑/↓", "Scroll"),
            Self::key_line("PgUp/PgDn", "Scroll a page"),
            Self::key_line("Home/End", "First / last row"),
            Line::from(""),
            Line::from(vec![
                Span::styled("Current mode: ", Theme::text_dim()),
                Span::styled(mode.label(), Theme::text_highlight()),
            ]),
            Line::from(Span::styled(
                "Search works in: Time, Level, Message columns",
                Theme::text_dim(),
            )),
        ];

        if mode.is_online() {
            help_text.push(Line::from(Span::styled(
                "SUB: heartbeat that keeps the UDP session alive",
                Theme::text_dim(),
            )));
        }

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(" Help ", Theme::title())),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>10}", key), Theme::status_bar_key()),
            Span::styled(format!("  {}", desc), Theme::text()),
        ])
    }
}
