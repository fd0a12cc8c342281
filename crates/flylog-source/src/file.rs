use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::codec::{AnyDelimiterCodec, AnyDelimiterCodecError, FramedRead};
use tokio_util::sync::CancellationToken;

use flylog_logs::IngestionBuffer;
use flylog_types::SequenceCounter;

use crate::error::{Result, SourceError};
use crate::event::Ingest;

/// Longest accepted line; anything longer aborts the read
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Fail early when the input file is missing
pub fn check_input(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(SourceError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Bulk source: reads a newline-delimited file in batches
pub struct FileSource {
    path: PathBuf,
    batch_size: usize,
    max_line_bytes: usize,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, batch_size: usize, max_line_bytes: usize) -> Self {
        Self {
            path: path.into(),
            batch_size,
            max_line_bytes,
        }
    }

    /// Spawn the reader task. It reports the outcome through the channel
    /// (`EndOfInput` or `Failed`) rather than its join handle.
    pub fn spawn(
        self,
        counter: SequenceCounter,
        tx: mpsc::UnboundedSender<Ingest>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match self.read(counter, &tx, cancel).await {
                Ok(lines) => {
                    tracing::info!(path = %self.path.display(), lines, "end of input");
                    let _ = tx.send(Ingest::EndOfInput);
                }
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "file read aborted");
                    let _ = tx.send(Ingest::Failed(e.to_string()));
                }
            }
        })
    }

    /// Read every line in file order, sending a batch whenever the buffer
    /// fills and the remainder at end of file. Returns the number of lines.
    pub async fn read(
        &self,
        counter: SequenceCounter,
        tx: &mpsc::UnboundedSender<Ingest>,
        cancel: CancellationToken,
    ) -> Result<usize> {
        let file = tokio::fs::File::open(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::FileNotFound {
                    path: self.path.clone(),
                }
            } else {
                SourceError::Io(e)
            }
        })?;
        tracing::debug!(path = %self.path.display(), "reading input file");

        let codec = AnyDelimiterCodec::new_with_max_length(b"\n".to_vec(), Vec::new(), self.max_line_bytes);
        let mut lines = FramedRead::new(file, codec);
        let mut buffer = IngestionBuffer::new(self.batch_size, counter);
        let mut count = 0;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = lines.next() => next,
            };

            let chunk = match next {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    // Keep what was read so far
                    if let Some(batch) = buffer.finish() {
                        let _ = tx.send(Ingest::Batch(batch));
                    }
                    return Err(match e {
                        AnyDelimiterCodecError::MaxChunkLengthExceeded => SourceError::LineTooLong {
                            limit: self.max_line_bytes,
                        },
                        AnyDelimiterCodecError::Io(e) => SourceError::Io(e),
                    });
                }
                None => break,
            };

            let text = String::from_utf8_lossy(&chunk);
            let line = text.strip_suffix('\r').unwrap_or(&text);
            count += 1;

            if let Some(batch) = buffer.push_line(line)
                && tx.send(Ingest::Batch(batch)).is_err()
            {
                return Ok(count);
            }
        }

        if let Some(batch) = buffer.finish() {
            let _ = tx.send(Ingest::Batch(batch));
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_lines(lines: &[String]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Ingest>) -> Vec<Ingest> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_check_input() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(check_input(file.path()).is_ok());
        assert!(matches!(
            check_input(Path::new("/definitely/not/here.log")),
            Err(SourceError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_reads_in_batches_with_remainder() {
        let lines: Vec<String> = (0..250).map(|i| format!("[INFO] line {}", i)).collect();
        let file = write_lines(&lines);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = FileSource::new(file.path(), 100, DEFAULT_MAX_LINE_BYTES);
        let count = source
            .read(SequenceCounter::new(), &tx, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(count, 250);

        let sizes: Vec<usize> = drain(&mut rx)
            .into_iter()
            .map(|msg| match msg {
                Ingest::Batch(batch) => batch.len(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_preserves_order_and_strips_crlf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"first\r\nsecond\n\nlast without newline").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = FileSource::new(file.path(), 100, DEFAULT_MAX_LINE_BYTES);
        source
            .read(SequenceCounter::new(), &tx, CancellationToken::new())
            .await
            .unwrap();

        let Some(Ingest::Batch(batch)) = drain(&mut rx).into_iter().next() else {
            panic!("expected one batch");
        };
        let messages: Vec<&str> = batch.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "", "last without newline"]);
        assert_eq!(batch.iter().map(|r| r.seq).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_overlong_line_is_fatal() {
        let lines = vec!["ok".to_string(), "x".repeat(64), "never read".to_string()];
        let file = write_lines(&lines);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = FileSource::new(file.path(), 100, 16);
        let result = source
            .read(SequenceCounter::new(), &tx, CancellationToken::new())
            .await;
        assert!(matches!(result, Err(SourceError::LineTooLong { limit: 16 })));

        // The line read before the error is still delivered
        let msgs = drain(&mut rx);
        assert!(matches!(&msgs[..], [Ingest::Batch(batch)] if batch.len() == 1));
    }

    #[tokio::test]
    async fn test_spawn_reports_end_of_input() {
        let file = write_lines(&["a".to_string(), "b".to_string()]);
        let (tx, mut rx) = mpsc::unbounded_channel();
        FileSource::new(file.path(), 100, DEFAULT_MAX_LINE_BYTES)
            .spawn(SequenceCounter::new(), tx, CancellationToken::new())
            .await
            .unwrap();

        let msgs = drain(&mut rx);
        assert!(matches!(msgs.last(), Some(Ingest::EndOfInput)));
    }

    #[tokio::test]
    async fn test_spawn_reports_missing_file() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        FileSource::new("/definitely/not/here.log", 100, DEFAULT_MAX_LINE_BYTES)
            .spawn(SequenceCounter::new(), tx, CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(drain(&mut rx).as_slice(), [Ingest::Failed(_)]));
    }
}
