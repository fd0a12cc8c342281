use ratatui::style::{Color, Modifier, Style};

use flylog_logs::RowStyle;

/// Color theme for the application
pub struct Theme;

impl Theme {
    // Base colors
    pub const FG: Color = Color::White;
    pub const FG_DIM: Color = Color::DarkGray;

    // Accent colors
    pub const PRIMARY: Color = Color::Cyan;
    pub const HIGHLIGHT: Color = Color::Yellow;

    // Status colors
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // Border styles
    pub fn border() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn border_focused() -> Style {
        Style::default().fg(Self::HIGHLIGHT)
    }

    // Text styles
    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn text_dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn text_highlight() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Column headers of the log table
    pub fn table_header() -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }

    /// Base style of a log row
    pub fn row(style: RowStyle) -> Style {
        Style::default().fg(style.fg.into()).bg(style.bg.into())
    }

    /// Query match inside a row; keeps the row background
    pub fn match_highlight(style: RowStyle) -> Style {
        Style::default()
            .fg(Self::HIGHLIGHT)
            .bg(style.bg.into())
            .add_modifier(Modifier::BOLD)
    }

    pub fn connection(connected: bool) -> Style {
        let color = if connected { Self::SUCCESS } else { Self::ERROR };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    // Hotkey bar
    pub fn status_bar() -> Style {
        Style::default().fg(Self::FG).bg(Color::Reset)
    }

    pub fn status_bar_key() -> Style {
        Style::default()
            .fg(Self::SUCCESS)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar_quit_key() -> Style {
        Style::default()
            .fg(Self::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    pub fn toggle_key(enabled: bool) -> Style {
        let color = if enabled { Self::SUCCESS } else { Self::ERROR };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    // Error
    pub fn error() -> Style {
        Style::default()
            .fg(Self::ERROR)
            .add_modifier(Modifier::BOLD)
    }
}
