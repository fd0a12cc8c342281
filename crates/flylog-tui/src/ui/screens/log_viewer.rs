use ratatui::{
    Frame,
    layout::{Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::UnicodeWidthChar;

use flylog_logs::{FilterStatus, Segment};
use flylog_types::{ConnectionState, level_color};

use crate::app::AppState;
use crate::ui::components::{HelpOverlay, hotkey_bar};
use crate::ui::{Layout, Theme};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Column widths (display cells); the message takes the rest
/// Minimum Idx column width; wider indices grow the column
const IDX_WIDTH: usize = 6;
const TIME_WIDTH: usize = 20;
const LEVEL_WIDTH: usize = 7;
const GAP: &str = " ";

/// The single log screen: status block, log table and hotkey bar
pub struct LogViewerScreen;

impl LogViewerScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (status_area, table_area, hotkey_area) = Layout::main(frame.area());

        Self::render_status(frame, status_area, state);
        Self::render_table(frame, table_area, state);
        frame.render_widget(hotkey_bar(state.ui_state.auto_scroll), hotkey_area);

        if state.ui_state.help_visible {
            HelpOverlay::render(frame, &state.mode);
        }
    }

    fn render_status(frame: &mut Frame, area: Rect, state: &AppState) {
        let mut info = vec![Span::styled(format!("flylog v{}", VERSION), Theme::title())];
        info.push(Span::styled("    ", Theme::text()));
        info.push(Span::styled(status_text(state), Theme::text()));

        if state.mode.is_online() {
            info.push(Span::styled("    ", Theme::text()));
            info.push(Span::styled(
                state.connection.label(),
                Theme::connection(state.connection == ConnectionState::Connected),
            ));
        } else if state.ui_state.end_of_input {
            info.push(Span::styled("    End of file", Theme::text_dim()));
        }

        if let Some(err) = &state.ui_state.error_message {
            info.push(Span::styled("    ", Theme::text()));
            info.push(Span::styled(format!("⚠ {}", err), Theme::error()));
        }

        let filter = state.store.filter();
        let focused = state.ui_state.filter_focused;
        let mut filter_line = vec![
            Span::styled(
                "Filter: ",
                if focused {
                    Theme::text_highlight()
                } else {
                    Theme::text_dim()
                },
            ),
            Span::styled(filter.input().to_string(), Theme::text_highlight()),
        ];
        if focused {
            filter_line.push(Span::styled("█", Theme::text_highlight()));
            filter_line.push(Span::styled(
                "  [Enter] Apply  [Esc] Cancel",
                Theme::text_dim(),
            ));
        }

        let status = Paragraph::new(vec![Line::from(info), Line::from(filter_line)]).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(if focused {
                    Theme::border_focused()
                } else {
                    Theme::border()
                })
                .title(Span::styled(" Status ", Theme::title())),
        );
        frame.render_widget(status, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // One row for the column headers, one column for the scrollbar
        let body_height = inner.height.saturating_sub(1) as usize;
        let width = inner.width.saturating_sub(1) as usize;
        state.set_viewport_height(body_height);

        let store = &state.store;
        let first = state.ui_state.log_scroll;
        let visible = store.view().iter().skip(first).take(body_height);
        let idx_width = visible
            .clone()
            .chain(store.view().last())
            .map(|record| digits(record.seq))
            .max()
            .unwrap_or(0)
            .max(IDX_WIDTH);

        let message_width = width.saturating_sub(idx_width + TIME_WIDTH + LEVEL_WIDTH + 3);
        let mut lines = vec![Line::from(vec![
            Span::styled(pad("Idx", idx_width), Theme::table_header()),
            Span::raw(GAP),
            Span::styled(pad("Time", TIME_WIDTH), Theme::table_header()),
            Span::raw(GAP),
            Span::styled(pad("Level", LEVEL_WIDTH), Theme::table_header()),
            Span::raw(GAP),
            Span::styled(pad("Message", message_width), Theme::table_header()),
        ])];

        for (offset, record) in visible.enumerate() {
            let row = first + offset;
            let Some(style) = store.row_style(row) else {
                break;
            };
            let base = Theme::row(style);
            let hl = Theme::match_highlight(style);
            let level_style = base.fg(level_color(record.level));

            let mut spans = vec![Span::styled(pad(&record.seq.to_string(), idx_width), base)];
            spans.push(Span::styled(GAP, base));
            spans.extend(fit_segments(&store.highlight(record.timestamp_str()), TIME_WIDTH, base, hl));
            spans.push(Span::styled(GAP, base));
            spans.extend(fit_segments(&store.highlight(record.level_str()), LEVEL_WIDTH, level_style, hl));
            spans.push(Span::styled(GAP, base));
            spans.extend(fit_segments(&store.highlight(&record.message), message_width, base, hl));
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), inner);

        let total = store.view().len();
        let max_scroll = state.max_scroll();
        if total > body_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(state.ui_state.log_scroll.min(max_scroll));
            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }
}

/// Record count part of the status block
pub fn status_text(state: &AppState) -> String {
    let mode = state.mode.label();
    match state.store.status() {
        FilterStatus::Typing => format!(
            "Mode: Typing...    {}    Logs: {}",
            mode,
            state.store.total()
        ),
        FilterStatus::Filtered { shown, total } => {
            format!("Mode: Filtered    {}    Logs: {}/{}", mode, shown, total)
        }
        FilterStatus::All { total } => format!("{}    Logs: {}", mode, total),
    }
}

/// Decimal digits of a sequence index
fn digits(seq: u64) -> usize {
    seq.checked_ilog10().map_or(1, |d| d as usize + 1)
}

/// Pad or truncate `text` to exactly `width` display cells
fn pad(text: &str, width: usize) -> String {
    let mut out = String::new();
    let used = push_truncated(&mut out, text, width);
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

/// Append as much of `text` as fits in `budget` cells; returns cells used
fn push_truncated(out: &mut String, text: &str, budget: usize) -> usize {
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    used
}

/// Lay highlighted segments into a cell of `width` display cells
fn fit_segments(segments: &[Segment<'_>], width: usize, base: Style, hl: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(segments.len() + 1);
    let mut used = 0;

    for segment in segments {
        if used >= width {
            break;
        }
        let mut text = String::new();
        used += push_truncated(&mut text, segment.text, width - used);
        if !text.is_empty() {
            spans.push(Span::styled(text, if segment.highlighted { hl } else { base }));
        }
    }

    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), base));
    }
    spans
}
