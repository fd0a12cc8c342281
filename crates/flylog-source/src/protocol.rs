//! Text protocol spoken with the log server over UDP

/// Client -> server subscription refresh
pub const HEARTBEAT: &[u8] = b"SUB";

/// Prefix of the server's liveness acknowledgment
pub const ACK_PREFIX: &str = "SUB_ACK";

/// Size of the receive buffer; longer datagrams are truncated by the OS
pub const MAX_DATAGRAM: usize = 4096;

/// A classified server datagram
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Datagram {
    /// Liveness acknowledgment
    Ack,
    /// Anything else is one raw log line
    Line(String),
}

impl Datagram {
    /// Classify a received payload. The payload is whitespace-trimmed first;
    /// invalid UTF-8 is replaced rather than rejected.
    pub fn classify(payload: &[u8]) -> Self {
        let text = String::from_utf8_lossy(payload);
        let text = text.trim();

        if text.starts_with(ACK_PREFIX) {
            Self::Ack
        } else {
            Self::Line(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_ack() {
        assert_eq!(Datagram::classify(b"SUB_ACK"), Datagram::Ack);
        assert_eq!(Datagram::classify(b"  SUB_ACK 42\n"), Datagram::Ack);
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(
            Datagram::classify(b"[INFO] hello\r\n"),
            Datagram::Line("[INFO] hello".to_string())
        );
        // Not a prefix match
        assert_eq!(
            Datagram::classify(b"got SUB_ACK"),
            Datagram::Line("got SUB_ACK".to_string())
        );
    }

    #[test]
    fn test_classify_invalid_utf8() {
        assert_eq!(
            Datagram::classify(&[b'o', b'k', 0xFF]),
            Datagram::Line("ok\u{FFFD}".to_string())
        );
    }
}
