use std::sync::Arc;
use std::time::{Duration, Instant};

use flylog_types::{ArcRecord, Record, Rgb};

use crate::colors::{RowStyle, SessionColors, row_style};
use crate::filter::{CompiledQuery, FilterEngine, FilterStatus, Segment, highlight};

/// How the displayed view changed after an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewChange {
    /// Nothing visible changed
    Unchanged,
    /// `count` rows were appended starting at display row `from`
    Appended { from: usize, count: usize },
    /// The view was rebuilt from scratch
    Replaced,
}

/// Record set, filtered view, query and session colors of one run.
///
/// Owned by the presentation thread; producers hand records over as
/// batches and never touch it directly.
#[derive(Debug)]
pub struct LogStore {
    /// Every retained record in arrival order
    records: Vec<ArcRecord>,

    /// Records matching the active query (all records without one)
    view: Vec<ArcRecord>,

    /// Debounced query
    filter: FilterEngine,

    /// Correlation key -> color memo
    colors: SessionColors,
}

impl LogStore {
    pub fn new(debounce: Duration, correlation_marker: &str) -> Self {
        Self {
            records: Vec::new(),
            view: Vec::new(),
            filter: FilterEngine::new(debounce),
            colors: SessionColors::new(correlation_marker),
        }
    }

    /// Append a flushed batch (bulk path) or a single record (realtime path).
    ///
    /// Matching records are appended to the end of the view; the view is not
    /// rebuilt, so ingestion stays linear in the number of records.
    pub fn apply_batch(&mut self, batch: Vec<Record>) -> ViewChange {
        let from = self.view.len();

        for record in batch {
            let record = Arc::new(record);
            self.records.push(Arc::clone(&record));

            let visible = self
                .filter
                .active()
                .is_none_or(|query| query.matches(&record));
            if visible {
                self.colors.assign(&record);
                self.view.push(record);
            }
        }

        let count = self.view.len() - from;
        if count == 0 {
            ViewChange::Unchanged
        } else {
            ViewChange::Appended { from, count }
        }
    }

    /// Realtime records are one-record batches
    pub fn apply_record(&mut self, record: Record) -> ViewChange {
        self.apply_batch(vec![record])
    }

    /// Rebuild the view from scratch under the active query
    fn rebuild(&mut self) -> ViewChange {
        let query = self.filter.active();
        self.view = self
            .records
            .iter()
            .filter(|record| query.is_none_or(|q| q.matches(record)))
            .cloned()
            .collect();

        for record in &self.view {
            self.colors.assign(record);
        }

        tracing::debug!(
            shown = self.view.len(),
            total = self.records.len(),
            "filtered view rebuilt"
        );
        ViewChange::Replaced
    }

    // ------------------------------------------------------------------
    // Filter input
    // ------------------------------------------------------------------

    /// Replace the filter input text (one keystroke)
    pub fn edit_filter(&mut self, text: impl Into<String>, now: Instant) {
        self.filter.edit(text, now);
    }

    pub fn filter_input_char(&mut self, c: char, now: Instant) {
        self.filter.input_char(c, now);
    }

    pub fn filter_input_backspace(&mut self, now: Instant) {
        self.filter.input_backspace(now);
    }

    /// Drive the debounce timer; rebuilds when the query settles
    pub fn tick(&mut self, now: Instant) -> ViewChange {
        if self.filter.poll(now) {
            self.rebuild()
        } else {
            ViewChange::Unchanged
        }
    }

    /// Settle the current input immediately
    pub fn confirm_filter(&mut self) -> ViewChange {
        self.filter.confirm();
        self.rebuild()
    }

    /// Clear the query and show everything
    pub fn cancel_filter(&mut self) -> ViewChange {
        self.filter.cancel();
        self.rebuild()
    }

    /// Drop every record, the view, the query and all session colors
    pub fn clear(&mut self) -> ViewChange {
        self.records.clear();
        self.view.clear();
        self.colors.clear();
        self.filter.cancel();
        ViewChange::Replaced
    }

    // ------------------------------------------------------------------
    // Read access for the sink
    // ------------------------------------------------------------------

    pub fn view(&self) -> &[ArcRecord] {
        &self.view
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn active_query(&self) -> Option<&CompiledQuery> {
        self.filter.active()
    }

    pub fn colors(&self) -> &SessionColors {
        &self.colors
    }

    /// Status to show instead of (or next to) the record count
    pub fn status(&self) -> FilterStatus {
        if self.filter.is_typing() {
            FilterStatus::Typing
        } else if self.filter.active().is_some() {
            FilterStatus::Filtered {
                shown: self.view.len(),
                total: self.records.len(),
            }
        } else {
            FilterStatus::All {
                total: self.records.len(),
            }
        }
    }

    /// Style of a display row
    pub fn row_style(&self, row: usize) -> Option<RowStyle> {
        let record = self.view.get(row)?;
        Some(row_style(self.session_color(record), row))
    }

    pub fn session_color(&self, record: &Record) -> Option<Rgb> {
        self.colors.session_of(record)
    }

    /// Highlight a field of a displayed record with the active query
    pub fn highlight<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        highlight(text, self.filter.active())
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(
            crate::debounce::DEFAULT_DEBOUNCE,
            crate::colors::DEFAULT_CORRELATION_MARKER,
        )
    }
}
