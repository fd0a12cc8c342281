use std::collections::HashMap;

use flylog_types::{Record, Rgb};

/// Default label that precedes a correlation key in a message
pub const DEFAULT_CORRELATION_MARKER: &str = "call-id:";

/// Session colors handed out in first-seen order, wrapping around
pub const SESSION_PALETTE: [Rgb; 7] = [
    Rgb::from_hex(0xFF6B6B), // red
    Rgb::from_hex(0xFFD166), // yellow
    Rgb::from_hex(0x06D6A0), // green
    Rgb::from_hex(0x118AB2), // blue
    Rgb::from_hex(0x9D4EDD), // purple
    Rgb::from_hex(0x00BBF9), // cyan
    Rgb::from_hex(0xFF9E6D), // orange
];

/// Row backgrounds for records without a session (even, odd)
const NEUTRAL_BG: [Rgb; 2] = [Rgb::from_hex(0x1E1E1E), Rgb::from_hex(0x2D2D2D)];
const NEUTRAL_FG: Rgb = Rgb(255, 255, 255);

/// Share of the session color in a keyed row background
const SESSION_MIX: f64 = 0.3;
const SESSION_BG_MIN: u8 = 25;
const SESSION_BG_MAX: u8 = 90;

/// Brightening applied to the session color for keyed row text
const SESSION_FG_SCALE: f64 = 1.5;
const SESSION_FG_MIN: u8 = 180;
const SESSION_FG_MAX: u8 = 255;

/// Memoized correlation key -> color mapping.
///
/// Assignments are permanent until [`SessionColors::clear`], even when the
/// records that introduced a key are no longer in view.
#[derive(Debug)]
pub struct SessionColors {
    /// Lowercased label searched for in messages
    marker: String,

    /// Assigned colors
    assigned: HashMap<String, Rgb>,

    /// Keys in insertion order
    order: Vec<String>,
}

impl SessionColors {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_ascii_lowercase(),
            assigned: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Extract the correlation key from a message.
    ///
    /// The label is matched case-insensitively; the key is the next
    /// whitespace-delimited word after it.
    pub fn correlation_key<'a>(&self, message: &'a str) -> Option<&'a str> {
        if self.marker.is_empty() {
            return None;
        }
        // ASCII lowercasing keeps byte offsets aligned with `message`
        let lower = message.to_ascii_lowercase();
        let start = lower.find(&self.marker)? + self.marker.len();
        message[start..].split_whitespace().next()
    }

    /// Color for a key, assigning the next palette entry on first sight
    pub fn color_for(&mut self, key: &str) -> Rgb {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }

        let color = SESSION_PALETTE[self.order.len() % SESSION_PALETTE.len()];
        self.assigned.insert(key.to_string(), color);
        self.order.push(key.to_string());
        color
    }

    /// Ensure the record's key (if any) has a color
    pub fn assign(&mut self, record: &Record) -> Option<Rgb> {
        let key = self.correlation_key(&record.message)?;
        Some(self.color_for(key))
    }

    /// Already-assigned color of the record's session, without assigning
    pub fn session_of(&self, record: &Record) -> Option<Rgb> {
        let key = self.correlation_key(&record.message)?;
        self.assigned.get(key).copied()
    }

    /// Keys in the order they were first seen
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every assignment (only on "clear all")
    pub fn clear(&mut self) {
        self.assigned.clear();
        self.order.clear();
    }
}

impl Default for SessionColors {
    fn default() -> Self {
        Self::new(DEFAULT_CORRELATION_MARKER)
    }
}

/// Foreground and background of a display row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowStyle {
    pub fg: Rgb,
    pub bg: Rgb,
}

/// Compute the style of the display row `row` for a record whose session
/// color is `session` (`None` for records without a correlation key).
pub fn row_style(session: Option<Rgb>, row: usize) -> RowStyle {
    let base = NEUTRAL_BG[row % 2];
    match session {
        None => RowStyle {
            fg: NEUTRAL_FG,
            bg: base,
        },
        Some(color) => {
            let bg = Rgb(
                mix(base.0, color.0),
                mix(base.1, color.1),
                mix(base.2, color.2),
            );
            RowStyle {
                fg: color.map_channels(SESSION_FG_MIN, SESSION_FG_MAX, |c| {
                    c as f64 * SESSION_FG_SCALE
                }),
                bg,
            }
        }
    }
}

fn mix(base: u8, session: u8) -> u8 {
    let mixed = base as f64 * (1.0 - SESSION_MIX) + session as f64 * SESSION_MIX;
    mixed.clamp(SESSION_BG_MIN as f64, SESSION_BG_MAX as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineParser;

    #[test]
    fn test_correlation_key_extraction() {
        let colors = SessionColors::default();
        assert_eq!(colors.correlation_key("Call-ID: abc123 failed"), Some("abc123"));
        assert_eq!(colors.correlation_key("call-id:xyz"), Some("xyz"));
        assert_eq!(colors.correlation_key("CALL-ID:   k1\tnext"), Some("k1"));
        assert_eq!(colors.correlation_key("Call-ID:   "), None);
        assert_eq!(colors.correlation_key("Call-ID:"), None);
        assert_eq!(colors.correlation_key("no marker"), None);
    }

    #[test]
    fn test_correlation_key_after_multibyte_text() {
        let colors = SessionColors::default();
        assert_eq!(colors.correlation_key("звонок Call-ID: s-1 ок"), Some("s-1"));
    }

    #[test]
    fn test_custom_marker() {
        let colors = SessionColors::new("Session=");
        assert_eq!(colors.correlation_key("user session=42 ok"), Some("42"));
    }

    #[test]
    fn test_color_assignment_is_deterministic() {
        let mut colors = SessionColors::default();
        let a = colors.color_for("a");
        let b = colors.color_for("b");
        assert_eq!(a, SESSION_PALETTE[0]);
        assert_eq!(b, SESSION_PALETTE[1]);
        assert_eq!(colors.color_for("a"), a);
        assert_eq!(colors.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_palette_wraps_around() {
        let mut colors = SessionColors::default();
        for i in 0..SESSION_PALETTE.len() {
            colors.color_for(&format!("k{}", i));
        }
        assert_eq!(colors.color_for("wrapped"), SESSION_PALETTE[0]);
        assert_eq!(colors.len(), SESSION_PALETTE.len() + 1);
    }

    #[test]
    fn test_clear_restarts_palette() {
        let mut colors = SessionColors::default();
        colors.color_for("a");
        colors.color_for("b");
        colors.clear();
        assert!(colors.is_empty());
        assert_eq!(colors.color_for("b"), SESSION_PALETTE[0]);
    }

    #[test]
    fn test_assign_and_session_of() {
        let mut colors = SessionColors::default();
        let keyed = LineParser::parse("[2024-01-01 00:00:00] [INFO] Call-ID: abc123 ringing", 0);
        let plain = LineParser::parse("no session", 1);

        assert_eq!(colors.session_of(&keyed), None);
        assert_eq!(colors.assign(&keyed), Some(SESSION_PALETTE[0]));
        assert_eq!(colors.session_of(&keyed), Some(SESSION_PALETTE[0]));
        assert_eq!(colors.assign(&plain), None);
    }

    #[test]
    fn test_neutral_rows_alternate() {
        assert_eq!(row_style(None, 0).bg, Rgb(0x1E, 0x1E, 0x1E));
        assert_eq!(row_style(None, 1).bg, Rgb(0x2D, 0x2D, 0x2D));
        assert_eq!(row_style(None, 2).fg, Rgb(255, 255, 255));
    }

    #[test]
    fn test_keyed_row_style() {
        // red session on an odd row: base gray 45
        let style = row_style(Some(Rgb::from_hex(0xFF6B6B)), 1);
        // 45 * 0.7 + 255 * 0.3 = 108 -> clamped to 90
        // 45 * 0.7 + 107 * 0.3 = 63.6
        assert_eq!(style.bg, Rgb(90, 63, 63));
        // 255 * 1.5 -> 255, 107 * 1.5 = 160.5 -> raised to 180
        assert_eq!(style.fg, Rgb(255, 180, 180));
    }

    #[test]
    fn test_keyed_rows_stay_in_ranges() {
        for color in SESSION_PALETTE {
            for row in 0..2 {
                let style = row_style(Some(color), row);
                for c in [style.bg.0, style.bg.1, style.bg.2] {
                    assert!((SESSION_BG_MIN..=SESSION_BG_MAX).contains(&c));
                }
                for c in [style.fg.0, style.fg.1, style.fg.2] {
                    assert!(c >= SESSION_FG_MIN);
                }
            }
        }
    }
}
