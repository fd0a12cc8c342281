use regex::Regex;
use std::time::{Duration, Instant};

use flylog_types::Record;

use crate::debounce::Debounce;

/// Compiled case-insensitive substring query
#[derive(Clone)]
pub struct CompiledQuery {
    /// Escaped literal with `(?i)`
    regex: Regex,

    /// Trimmed query text
    pattern: String,
}

impl CompiledQuery {
    /// Compile a query. Surrounding whitespace is ignored and an empty
    /// query yields `None` (no filter).
    pub fn new(pattern: &str) -> Result<Option<Self>, regex::Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(None);
        }

        // The query is a literal, not a regex
        let regex = Regex::new(&format!("(?i){}", regex::escape(pattern)))?;

        Ok(Some(Self {
            regex,
            pattern: pattern.to_string(),
        }))
    }

    /// Check a single field
    pub fn matches_text(&self, text: &str) -> bool {
        !text.is_empty() && self.regex.is_match(text)
    }

    /// A record matches if any of its four searchable fields contains the query
    pub fn matches(&self, record: &Record) -> bool {
        record
            .searchable_fields()
            .iter()
            .any(|field| self.matches_text(field))
    }

    /// Find all non-overlapping match positions, left to right (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        if text.is_empty() {
            return Vec::new();
        }
        self.regex
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect()
    }

    /// Get the query text
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl std::fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// A run of text that is either part of a match or not
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

/// Split `text` into plain and highlighted segments for every occurrence of
/// the query. No query or empty text short-circuits to no highlight.
pub fn highlight<'a>(text: &'a str, query: Option<&CompiledQuery>) -> Vec<Segment<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    let Some(query) = query else {
        return vec![Segment {
            text,
            highlighted: false,
        }];
    };

    let mut segments = Vec::new();
    let mut last_end = 0;
    for (start, end) in query.find_matches(text) {
        if start > last_end {
            segments.push(Segment {
                text: &text[last_end..start],
                highlighted: false,
            });
        }
        segments.push(Segment {
            text: &text[start..end],
            highlighted: true,
        });
        last_end = end;
    }
    if last_end < text.len() {
        segments.push(Segment {
            text: &text[last_end..],
            highlighted: false,
        });
    }
    segments
}

/// What the filter bar should show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterStatus {
    /// An edit is waiting for the debounce to settle
    Typing,
    /// A query is active
    Filtered { shown: usize, total: usize },
    /// No query, everything shown
    All { total: usize },
}

/// Live, debounced query state.
///
/// Edits only arm the debounce timer; the query that the view is built
/// from changes when the timer fires or on an explicit confirm/cancel.
#[derive(Debug, Default)]
pub struct FilterEngine {
    /// Text currently in the input box
    input: String,

    /// Pending evaluation
    debounce: Debounce,

    /// Query the view is currently built from
    active: Option<CompiledQuery>,

    /// Number of settle evaluations performed
    evaluations: u64,
}

impl FilterEngine {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce: Debounce::new(debounce),
            ..Self::default()
        }
    }

    /// Replace the input text (one keystroke) and restart the debounce window
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.debounce.schedule(now);
    }

    /// Append a character to the input
    pub fn input_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.debounce.schedule(now);
    }

    /// Remove the last character of the input
    pub fn input_backspace(&mut self, now: Instant) {
        self.input.pop();
        self.debounce.schedule(now);
    }

    /// Settle if the debounce is due. Returns true when the active query
    /// was re-evaluated and the view must be rebuilt.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.debounce.poll(now) {
            self.settle();
            true
        } else {
            false
        }
    }

    /// Settle immediately with the current input
    pub fn confirm(&mut self) {
        self.debounce.cancel();
        self.settle();
    }

    /// Clear the input and settle on the empty query
    pub fn cancel(&mut self) {
        self.input.clear();
        self.debounce.cancel();
        self.settle();
    }

    fn settle(&mut self) {
        self.evaluations += 1;
        match CompiledQuery::new(&self.input) {
            Ok(query) => self.active = query,
            // Keep the previous query so the view stays consistent
            Err(e) => tracing::warn!(error = %e, "query rejected"),
        }
    }

    /// True while an edit of a non-empty input is waiting to settle
    pub fn is_typing(&self) -> bool {
        self.debounce.is_pending() && !self.input.trim().is_empty()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn active(&self) -> Option<&CompiledQuery> {
        self.active.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}
