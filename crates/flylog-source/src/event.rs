use chrono::Local;
use tokio::sync::mpsc;

use flylog_logs::LineParser;
use flylog_types::{ConnectionState, Level, Record, SequenceCounter};

/// Messages handed from producer tasks to the presentation thread
#[derive(Clone, Debug)]
pub enum Ingest {
    /// One realtime record
    Record(Record),
    /// A flushed bulk batch
    Batch(Vec<Record>),
    /// The UDP subscription changed state
    Connection(ConnectionState),
    /// The file source reached the end of its input
    EndOfInput,
    /// The file source stopped on an unrecoverable error
    Failed(String),
}

/// Format a client-generated status message as a log line, so it gets the
/// same timestamp and level columns as server lines
pub fn status_line(level: Level, text: &str) -> String {
    format!(
        "[{}] {} {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level.tag(),
        text
    )
}

/// Sender side used by the realtime producers
#[derive(Clone, Debug)]
pub struct RecordSender {
    tx: mpsc::UnboundedSender<Ingest>,
    counter: SequenceCounter,
}

impl RecordSender {
    pub fn new(tx: mpsc::UnboundedSender<Ingest>, counter: SequenceCounter) -> Self {
        Self { tx, counter }
    }

    /// Parse and send a raw line as a one-record batch.
    /// Returns false once the receiver is gone.
    pub fn line(&self, raw: &str) -> bool {
        let record = LineParser::parse(raw, self.counter.next());
        self.tx.send(Ingest::Record(record)).is_ok()
    }

    /// Send a client status message
    pub fn status(&self, level: Level, text: &str) -> bool {
        self.line(&status_line(level, text))
    }

    pub fn connection(&self, state: ConnectionState) -> bool {
        self.tx.send(Ingest::Connection(state)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_parses_back() {
        let line = status_line(Level::Warn, "Lost connection to 127.0.0.1:9090");
        let record = LineParser::parse(&line, 0);
        assert_eq!(record.level, Some(Level::Warn));
        assert_eq!(record.message, "Lost connection to 127.0.0.1:9090");
        assert_eq!(record.timestamp.map(|t| t.len()), Some(19));
    }

    #[test]
    fn test_sender_assigns_sequence() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sender = RecordSender::new(tx, SequenceCounter::new());
        assert!(sender.line("a"));
        assert!(sender.status(Level::Info, "b"));

        let seqs: Vec<u64> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|msg| match msg {
                Ingest::Record(r) => Some(r.seq),
                _ => None,
            })
            .collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn test_sender_reports_closed_channel() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let sender = RecordSender::new(tx, SequenceCounter::new());
        assert!(!sender.line("lost"));
    }
}
