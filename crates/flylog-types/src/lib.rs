//! Shared types for flylog
//!
//! This crate contains data structures used across multiple flylog crates.

use ratatui::style::Color;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level, detected from a bracketed tag such as `[WARN]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Web,
}

impl Level {
    /// Detection order. When a line carries several tags, the first entry
    /// of this list that is present wins, regardless of position in the text.
    pub const PRIORITY: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Web,
    ];

    /// The bracketed tag as it appears in raw lines
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Debug => "[DEBUG]",
            Self::Info => "[INFO]",
            Self::Warn => "[WARN]",
            Self::Error => "[ERROR]",
            Self::Web => "[WEB]",
        }
    }

    /// Display label (tag without brackets)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Web => "WEB",
        }
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Debug => Color::Cyan,
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
            Self::Web => Color::Blue,
        }
    }
}

/// Color used for the level cell of a record
pub fn level_color(level: Option<Level>) -> Color {
    level.map(|l| l.color()).unwrap_or(Color::White)
}

/// A single parsed log line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    /// Run-wide sequence number, never reused
    pub seq: u64,

    /// Text of the leading bracketed prefix (if any)
    pub timestamp: Option<String>,

    /// Detected log level
    pub level: Option<Level>,

    /// Line with every level tag stripped, trimmed
    pub message: String,

    /// Line after timestamp removal with tags still present.
    /// Searched by the filter but never displayed.
    pub raw: String,
}

impl Record {
    /// Timestamp text, empty when absent
    pub fn timestamp_str(&self) -> &str {
        self.timestamp.as_deref().unwrap_or("")
    }

    /// Level label, empty when no tag was found
    pub fn level_str(&self) -> &str {
        self.level.map(|l| l.as_str()).unwrap_or("")
    }

    /// The four fields the filter searches, in display order
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            self.timestamp_str(),
            self.level_str(),
            &self.message,
            &self.raw,
        ]
    }
}

/// Shared handle to an immutable record
pub type ArcRecord = Arc<Record>;

/// Monotonic sequence source shared by every producer of a run
#[derive(Clone, Debug, Default)]
pub struct SequenceCounter {
    next: Arc<AtomicU64>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next sequence number
    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of sequence numbers handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Connection Types
// ============================================================================

/// Liveness of the UDP subscription
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connected => "Connected",
        }
    }
}

// ============================================================================
// Color Types
// ============================================================================

/// Plain 24-bit color used by the style computations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Self(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }

    /// Apply `f` to each channel, clamping the result into `min..=max`
    pub fn map_channels<F>(self, min: u8, max: u8, f: F) -> Self
    where
        F: Fn(u8) -> f64,
    {
        let clamp = |c: u8| f(c).clamp(min as f64, max as f64) as u8;
        Self(clamp(self.0), clamp(self.1), clamp(self.2))
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Color::Rgb(rgb.0, rgb.1, rgb.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        assert_eq!(Rgb::from_hex(0xFF6B6B), Rgb(0xFF, 0x6B, 0x6B));
        assert_eq!(Rgb::from_hex(0x1E1E1E), Rgb(30, 30, 30));
    }

    #[test]
    fn test_map_channels_clamps() {
        let scaled = Rgb(10, 100, 200).map_channels(180, 255, |c| c as f64 * 1.5);
        assert_eq!(scaled, Rgb(180, 180, 255));
    }

    #[test]
    fn test_sequence_counter_shared() {
        let a = SequenceCounter::new();
        let b = a.clone();
        assert_eq!(a.next(), 0);
        assert_eq!(b.next(), 1);
        assert_eq!(a.issued(), 2);
    }

    #[test]
    fn test_record_searchable_fields() {
        let record = Record {
            seq: 0,
            timestamp: None,
            level: Some(Level::Warn),
            message: "disk low".to_string(),
            raw: "[WARN] disk low".to_string(),
        };
        assert_eq!(
            record.searchable_fields(),
            ["", "WARN", "disk low", "[WARN] disk low"]
        );
    }
}
