use flylog_types::{Record, SequenceCounter};

use crate::LineParser;

/// Default number of records per bulk flush
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Staging buffer for bulk (file) input.
///
/// Lines are parsed as they arrive and accumulated; a full batch is handed
/// back to the caller, which forwards it to the presentation thread as one
/// unit. Realtime input does not go through here.
#[derive(Debug)]
pub struct IngestionBuffer {
    /// Parsed, not yet flushed records
    pending: Vec<Record>,

    /// Flush threshold
    capacity: usize,

    /// Run-wide sequence source
    counter: SequenceCounter,
}

impl IngestionBuffer {
    pub fn new(capacity: usize, counter: SequenceCounter) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Vec::with_capacity(capacity),
            capacity,
            counter,
        }
    }

    /// Parse a line into the batch. Returns the full batch once capacity is
    /// reached; the buffer is empty again afterwards.
    pub fn push_line(&mut self, line: &str) -> Option<Vec<Record>> {
        let record = LineParser::parse(line, self.counter.next());
        self.pending.push(record);

        if self.pending.len() >= self.capacity {
            self.take()
        } else {
            None
        }
    }

    /// End of input: hand back the non-empty remainder
    pub fn finish(&mut self) -> Option<Vec<Record>> {
        if self.pending.is_empty() {
            None
        } else {
            self.take()
        }
    }

    fn take(&mut self) -> Option<Vec<Record>> {
        let batch = std::mem::replace(&mut self.pending, Vec::with_capacity(self.capacity));
        tracing::debug!(records = batch.len(), "flushing ingestion batch");
        Some(batch)
    }

    /// Records waiting for the next flush
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
