use std::path::PathBuf;
use std::time::Instant;

use flylog_logs::{LogStore, Record, ViewChange};
use flylog_types::ConnectionState;

use super::Action;
use crate::config::KeyContext;

/// Where the records come from
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Subscribed to a log server
    Online { server: String },
    /// Reading a file
    File { path: PathBuf },
}

impl Mode {
    pub fn label(&self) -> String {
        match self {
            Self::Online { server } => format!("Online [{}]", server),
            Self::File { path } => format!("File [{}]", path.display()),
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online { .. })
    }
}

/// UI-specific state
#[derive(Debug)]
pub struct UiState {
    /// Does the filter input have focus?
    pub filter_focused: bool,

    /// Is help overlay visible?
    pub help_visible: bool,

    /// Follow new rows as they arrive
    pub auto_scroll: bool,

    /// First display row shown in the table
    pub log_scroll: usize,

    /// Number of table rows that fit on screen (set by the renderer)
    pub viewport_height: usize,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// The file source delivered its last record
    pub end_of_input: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            filter_focused: false,
            help_visible: false,
            auto_scroll: false,
            log_scroll: 0,
            viewport_height: 1,
            error_message: None,
            end_of_input: false,
        }
    }
}

/// Global application state, owned by the presentation loop
pub struct AppState {
    /// Records, filtered view, query and session colors
    pub store: LogStore,

    /// Input mode
    pub mode: Mode,

    /// Liveness of the UDP subscription (online mode only)
    pub connection: ConnectionState,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Dirty flag for rendering - only render when true
    pub render_dirty: bool,
}

impl AppState {
    pub fn new(mode: Mode, store: LogStore, auto_scroll: bool) -> Self {
        Self {
            store,
            mode,
            connection: ConnectionState::Disconnected,
            ui_state: UiState {
                auto_scroll,
                ..UiState::default()
            },
            should_quit: false,
            render_dirty: true,
        }
    }

    /// Key binding context for the current focus
    pub fn key_context(&self) -> KeyContext {
        if self.ui_state.help_visible {
            KeyContext::Help
        } else if self.ui_state.filter_focused {
            KeyContext::FilterInput
        } else {
            KeyContext::LogViewer
        }
    }

    // ------------------------------------------------------------------
    // Producer input
    // ------------------------------------------------------------------

    /// Apply a flushed bulk batch
    pub fn apply_batch(&mut self, batch: Vec<Record>) {
        let change = self.store.apply_batch(batch);
        self.on_view_change(change);
        // The record count in the status line changes even when no row does
        self.render_dirty = true;
    }

    /// Apply one realtime record
    pub fn apply_record(&mut self, record: Record) {
        let change = self.store.apply_record(record);
        self.on_view_change(change);
        self.render_dirty = true;
    }

    pub fn set_connection(&mut self, state: ConnectionState) {
        if self.connection != state {
            self.connection = state;
            self.render_dirty = true;
        }
    }

    pub fn finish_input(&mut self) {
        self.ui_state.end_of_input = true;
        self.render_dirty = true;
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.error_message = Some(msg);
        self.render_dirty = true;
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        if self.ui_state.error_message.take().is_some() {
            self.render_dirty = true;
        }
    }

    /// Drive the filter debounce
    pub fn tick(&mut self, now: Instant) {
        let change = self.store.tick(now);
        self.on_view_change(change);
    }

    /// Deadline of the pending filter evaluation
    pub fn next_deadline(&self) -> Option<Instant> {
        self.store.filter().deadline()
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn handle_action(&mut self, action: Action, now: Instant) {
        self.render_dirty = true;

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::ToggleHelp => {
                self.ui_state.help_visible = !self.ui_state.help_visible;
            }
            Action::ToggleAutoScroll => {
                self.ui_state.auto_scroll = !self.ui_state.auto_scroll;
                if self.ui_state.auto_scroll {
                    self.scroll_to_bottom();
                }
            }

            // Filter input
            Action::FocusFilter => {
                self.ui_state.filter_focused = true;
            }
            Action::FilterInput(c) => {
                self.store.filter_input_char(c, now);
            }
            Action::FilterBackspace => {
                self.store.filter_input_backspace(now);
            }
            Action::FilterClearInput => {
                self.store.edit_filter(String::new(), now);
            }
            Action::FilterConfirm => {
                self.ui_state.filter_focused = false;
                let change = self.store.confirm_filter();
                self.on_view_change(change);
            }
            Action::FilterCancel => {
                self.ui_state.filter_focused = false;
                let change = self.store.cancel_filter();
                self.on_view_change(change);
            }

            // Record set
            Action::ClearFilter => {
                let change = self.store.cancel_filter();
                self.on_view_change(change);
            }
            Action::ClearAll => {
                let change = self.store.clear();
                self.dismiss_error();
                self.on_view_change(change);
            }

            // Navigation
            Action::ScrollUp(n) => {
                self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(n);
            }
            Action::ScrollDown(n) => {
                self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(n);
                self.clamp_scroll();
            }
            Action::PageUp => {
                let page = self.page_size();
                self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(page);
            }
            Action::PageDown => {
                let page = self.page_size();
                self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_add(page);
                self.clamp_scroll();
            }
            Action::ScrollToTop => {
                self.ui_state.log_scroll = 0;
            }
            Action::ScrollToBottom => {
                self.scroll_to_bottom();
            }
        }
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    /// Called by the renderer once the table area is known
    pub fn set_viewport_height(&mut self, height: usize) {
        let height = height.max(1);
        if self.ui_state.viewport_height != height {
            self.ui_state.viewport_height = height;
            if self.ui_state.auto_scroll {
                self.scroll_to_bottom();
            } else {
                self.clamp_scroll();
            }
        }
    }

    pub fn max_scroll(&self) -> usize {
        self.store
            .view()
            .len()
            .saturating_sub(self.ui_state.viewport_height)
    }

    fn page_size(&self) -> usize {
        self.ui_state.viewport_height.saturating_sub(1).max(1)
    }

    fn scroll_to_bottom(&mut self) {
        self.ui_state.log_scroll = self.max_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.ui_state.log_scroll = self.ui_state.log_scroll.min(self.max_scroll());
    }

    fn on_view_change(&mut self, change: ViewChange) {
        match change {
            ViewChange::Unchanged => {}
            ViewChange::Appended { .. } => {
                if self.ui_state.auto_scroll {
                    self.scroll_to_bottom();
                }
                self.render_dirty = true;
            }
            ViewChange::Replaced => {
                if self.store.active_query().is_some() && !self.store.view().is_empty() {
                    // A settled query shows its first match
                    self.ui_state.log_scroll = 0;
                } else if self.ui_state.auto_scroll {
                    self.scroll_to_bottom();
                } else {
                    self.clamp_scroll();
                }
                self.render_dirty = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flylog_logs::{FilterStatus, LineParser};
    use std::time::Duration;

    fn state(auto_scroll: bool) -> AppState {
        let mut state = AppState::new(
            Mode::File {
                path: PathBuf::from("calls.log"),
            },
            LogStore::default(),
            auto_scroll,
        );
        state.set_viewport_height(10);
        state
    }

    fn batch(from: u64, count: u64) -> Vec<Record> {
        (from..from + count)
            .map(|i| LineParser::parse(&format!("[INFO] line {}", i), i))
            .collect()
    }

    #[test]
    fn test_mode_labels() {
        let online = Mode::Online {
            server: "127.0.0.1:9090".to_string(),
        };
        assert_eq!(online.label(), "Online [127.0.0.1:9090]");
        assert!(online.is_online());
        let file = Mode::File {
            path: PathBuf::from("a.log"),
        };
        assert_eq!(file.label(), "File [a.log]");
    }

    #[test]
    fn test_key_context_follows_focus() {
        let mut state = state(false);
        let now = Instant::now();
        assert_eq!(state.key_context(), KeyContext::LogViewer);
        state.handle_action(Action::FocusFilter, now);
        assert_eq!(state.key_context(), KeyContext::FilterInput);
        state.handle_action(Action::ToggleHelp, now);
        assert_eq!(state.key_context(), KeyContext::Help);
    }

    #[test]
    fn test_auto_scroll_follows_tail() {
        let mut state = state(true);
        state.apply_batch(batch(0, 25));
        assert_eq!(state.ui_state.log_scroll, 15);

        state.apply_record(LineParser::parse("[INFO] one more", 25));
        assert_eq!(state.ui_state.log_scroll, 16);
    }

    #[test]
    fn test_without_auto_scroll_position_stays() {
        let mut state = state(false);
        state.apply_batch(batch(0, 25));
        assert_eq!(state.ui_state.log_scroll, 0);

        state.handle_action(Action::ScrollDown(100), Instant::now());
        assert_eq!(state.ui_state.log_scroll, 15);
        state.handle_action(Action::PageUp, Instant::now());
        assert_eq!(state.ui_state.log_scroll, 6);
    }

    #[test]
    fn test_debounced_filter_through_actions() {
        let mut state = state(false);
        state.apply_batch(batch(0, 20));
        let start = Instant::now();

        state.handle_action(Action::FocusFilter, start);
        for (i, c) in "line 1".chars().enumerate() {
            state.handle_action(Action::FilterInput(c), start + Duration::from_millis(i as u64 * 50));
        }
        assert_eq!(state.store.status(), FilterStatus::Typing);
        let deadline = state.next_deadline().unwrap();

        state.tick(deadline - Duration::from_millis(1));
        assert_eq!(state.store.status(), FilterStatus::Typing);

        state.tick(deadline);
        // "line 1" and "line 10".."line 19"
        assert_eq!(
            state.store.status(),
            FilterStatus::Filtered { shown: 11, total: 20 }
        );
        assert_eq!(state.store.filter().evaluations(), 1);
    }

    #[test]
    fn test_settled_filter_jumps_to_first_match() {
        let mut state = state(true);
        state.apply_batch(batch(0, 40));
        assert_eq!(state.ui_state.log_scroll, 30);

        let now = Instant::now();
        state.handle_action(Action::FocusFilter, now);
        state.handle_action(Action::FilterInput('3'), now);
        state.handle_action(Action::FilterConfirm, now);
        assert!(!state.ui_state.filter_focused);
        assert_eq!(state.ui_state.log_scroll, 0);
        assert_eq!(state.store.view().len(), 13);

        // Clearing the filter with auto-scroll on returns to the tail
        state.handle_action(Action::ClearFilter, now);
        assert_eq!(state.store.filter().input(), "");
        assert_eq!(state.ui_state.log_scroll, 30);
    }

    #[test]
    fn test_filter_cancel_clears_query() {
        let mut state = state(false);
        state.apply_batch(batch(0, 5));
        let now = Instant::now();
        state.handle_action(Action::FocusFilter, now);
        state.handle_action(Action::FilterInput('4'), now);
        state.handle_action(Action::FilterConfirm, now);
        assert_eq!(state.store.view().len(), 1);

        state.handle_action(Action::FocusFilter, now);
        state.handle_action(Action::FilterCancel, now);
        assert_eq!(state.store.view().len(), 5);
        assert!(state.store.active_query().is_none());
    }

    #[test]
    fn test_clear_all() {
        let mut state = state(false);
        state.apply_batch(vec![LineParser::parse("Call-ID: k1 start", 0)]);
        state.show_error("boom".to_string());
        assert_eq!(state.store.colors().len(), 1);

        state.handle_action(Action::ClearAll, Instant::now());
        assert_eq!(state.store.total(), 0);
        assert!(state.store.colors().is_empty());
        assert!(state.ui_state.error_message.is_none());
        assert_eq!(state.ui_state.log_scroll, 0);
    }

    #[test]
    fn test_connection_changes_mark_dirty() {
        let mut state = state(false);
        state.render_dirty = false;
        state.set_connection(ConnectionState::Disconnected);
        assert!(!state.render_dirty);
        state.set_connection(ConnectionState::Connected);
        assert!(state.render_dirty);
    }
}
