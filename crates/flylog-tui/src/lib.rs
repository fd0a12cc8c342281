//! Terminal UI for flylog
//!
//! This crate provides the sink side of flylog: application state,
//! keybindings, settings, terminal event handling and the log screen.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Mode, UiState};
pub use config::{ConfigError, KeyBinding, KeyBindings, KeyContext, Settings};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{HelpOverlay, StatusBar, hotkey_bar};
pub use ui::screens::LogViewerScreen;
pub use ui::{Layout, Theme};
