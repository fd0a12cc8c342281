use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for the log screen
pub struct Layout;

impl Layout {
    /// Status block (info + filter line), log table and hotkey bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Status: two lines plus borders
                Constraint::Min(1),    // Log table
                Constraint::Length(3), // Hotkeys
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Centered popup of at most `width` x `height`
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}
