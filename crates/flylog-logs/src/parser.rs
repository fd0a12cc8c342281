use flylog_types::{Level, Record};

/// Lines at or below this length never carry a timestamp prefix
const MIN_TIMESTAMP_LINE_LEN: usize = 20;

/// Log parser for extracting structure from raw log lines
pub struct LineParser;

impl LineParser {
    /// Parse a raw log line into a Record. Never fails: unparsable input
    /// degrades to empty fields.
    pub fn parse(raw: &str, seq: u64) -> Record {
        let (timestamp, content) = Self::extract_timestamp(raw);
        let level = Self::detect_level(content);
        let message = Self::strip_tags(content);

        Record {
            seq,
            timestamp,
            level,
            message,
            raw: content.to_string(),
        }
    }

    /// Split a leading `[...]` prefix off the line.
    ///
    /// The length guard is checked before the bracket, so short lines that
    /// start with `[` keep their text untouched.
    fn extract_timestamp(raw: &str) -> (Option<String>, &str) {
        if raw.len() > MIN_TIMESTAMP_LINE_LEN
            && raw.starts_with('[')
            && let Some(close) = raw.find(']')
        {
            let timestamp = raw[1..close].to_string();
            return (Some(timestamp), raw[close + 1..].trim());
        }
        (None, raw)
    }

    /// First tag present in priority order
    fn detect_level(content: &str) -> Option<Level> {
        Level::PRIORITY
            .into_iter()
            .find(|level| content.contains(level.tag()))
    }

    /// Remove every occurrence of every known tag
    fn strip_tags(content: &str) -> String {
        let mut message = content.to_string();
        for level in Level::PRIORITY {
            if message.contains(level.tag()) {
                message = message.replace(level.tag(), "");
            }
        }
        message.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_line() {
        let record = LineParser::parse("[2024-01-01 00:00:00] [ERROR] Call-ID: abc123 failed", 7);
        assert_eq!(record.seq, 7);
        assert_eq!(record.timestamp.as_deref(), Some("2024-01-01 00:00:00"));
        assert_eq!(record.level, Some(Level::Error));
        assert_eq!(record.message, "Call-ID: abc123 failed");
        assert_eq!(record.raw, "[ERROR] Call-ID: abc123 failed");
    }

    #[test]
    fn test_parse_plain_short_line() {
        let record = LineParser::parse("no brackets here", 0);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.level, None);
        assert_eq!(record.message, "no brackets here");
        assert_eq!(record.raw, "no brackets here");
    }

    #[test]
    fn test_parse_empty_line() {
        let record = LineParser::parse("", 3);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.level, None);
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_short_bracketed_line_keeps_prefix() {
        // 20 chars exactly: the length guard wins over the bracket guard
        let line = "[INFO] twenty chars!";
        assert_eq!(line.len(), 20);
        let record = LineParser::parse(line, 0);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.level, Some(Level::Info));
        assert_eq!(record.message, "twenty chars!");
    }

    #[test]
    fn test_level_tag_at_start_of_long_line_is_taken_as_timestamp() {
        let record = LineParser::parse("[WARN] a fairly long line of text", 0);
        assert_eq!(record.timestamp.as_deref(), Some("WARN"));
        assert_eq!(record.level, None);
        assert_eq!(record.message, "a fairly long line of text");
    }

    #[test]
    fn test_missing_close_bracket() {
        let line = "[2024-01-01 00:00:00 [unterminated";
        let record = LineParser::parse(line, 0);
        assert_eq!(record.timestamp, None);
        assert_eq!(record.raw, line);
    }

    #[test]
    fn test_level_priority_over_position() {
        let record = LineParser::parse("x [ERROR] then [WARN] both", 0);
        assert_eq!(record.level, Some(Level::Warn));
        assert_eq!(record.message, "x  then  both");

        let record = LineParser::parse("[WEB] and [DEBUG]", 0);
        assert_eq!(record.level, Some(Level::Debug));
    }

    #[test]
    fn test_strips_every_occurrence() {
        let line = "one [INFO] two [INFO] three [ERROR]";
        let record = LineParser::parse(line, 0);
        assert_eq!(record.level, Some(Level::Info));
        assert_eq!(record.message, "one  two  three");
        assert_eq!(record.raw, line);
    }

    #[test]
    fn test_timestamp_absent_from_message() {
        let record = LineParser::parse("[12:00:00.123 UTC boot] [DEBUG] started", 0);
        assert_eq!(record.timestamp.as_deref(), Some("12:00:00.123 UTC boot"));
        assert!(!record.message.contains("12:00:00.123 UTC boot"));
        assert!(!record.raw.contains("12:00:00.123 UTC boot"));
    }

    #[test]
    fn test_parse_is_idempotent_apart_from_seq() {
        let line = "[2024-05-05 10:10:10] [WEB] GET /index 200";
        let mut a = LineParser::parse(line, 1);
        let b = LineParser::parse(line, 2);
        a.seq = b.seq;
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_multibyte_utf8_no_panic() {
        let line = "[время 2024-01-01 00:00] ─── сообщение";
        let record = LineParser::parse(line, 0);
        assert_eq!(record.timestamp.as_deref(), Some("время 2024-01-01 00:00"));
        assert_eq!(record.message, "─── сообщение");
    }
}
