//! Log processing for flylog
//!
//! This crate provides line parsing, bulk batching, the debounced filter,
//! session coloring and the record store the UI renders from.

mod buffer;
mod colors;
mod debounce;
mod filter;
mod parser;
mod store;

pub use buffer::{DEFAULT_BATCH_SIZE, IngestionBuffer};
pub use colors::{
    DEFAULT_CORRELATION_MARKER, RowStyle, SESSION_PALETTE, SessionColors, row_style,
};
pub use debounce::{DEFAULT_DEBOUNCE, Debounce};
pub use filter::{CompiledQuery, FilterEngine, FilterStatus, Segment, highlight};
pub use parser::LineParser;
pub use store::{LogStore, ViewChange};

// Re-export types used in our public API
pub use flylog_types::{ArcRecord, Level, Record, Rgb, SequenceCounter};
