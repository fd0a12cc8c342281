use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    /// The log table has focus
    LogViewer,
    /// The filter input has focus
    FilterInput,
    /// The help overlay is open
    Help,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings (function keys work everywhere)
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::F(1)), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::F(3)), Action::FocusFilter);
        global.insert(KeyBinding::new(KeyCode::F(4)), Action::ClearFilter);
        global.insert(KeyBinding::new(KeyCode::F(5)), Action::ClearAll);
        global.insert(KeyBinding::new(KeyCode::F(6)), Action::ToggleAutoScroll);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Log table
        let mut log_viewer = HashMap::new();
        log_viewer.insert(KeyBinding::new(KeyCode::Esc), Action::Quit);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('/')), Action::FocusFilter);
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Filter input bindings (when the input has focus)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::FilterConfirm);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::FilterCancel);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::FilterBackspace);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::FilterClearInput);
        bindings.insert(KeyContext::FilterInput, filter_input);

        // Help overlay
        let mut help = HashMap::new();
        help.insert(KeyBinding::new(KeyCode::Esc), Action::ToggleHelp);
        help.insert(KeyBinding::new(KeyCode::Char('q')), Action::ToggleHelp);
        bindings.insert(KeyContext::Help, help);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in filter input mode.
    /// Special keys map to their action; plain characters become input.
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        if let Some(action) = self.get_action(KeyContext::FilterInput, key) {
            return Some(action);
        }

        if let KeyCode::Char(c) = key.code
            && (key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT)
        {
            return Some(Action::FilterInput(c));
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_log_viewer_bindings() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('/'))),
            Some(Action::FocusFilter)
        );
        assert_eq!(
            kb.get_action(KeyContext::LogViewer, &key(KeyCode::F(5))),
            Some(Action::ClearAll)
        );
        assert_eq!(kb.get_action(KeyContext::LogViewer, &key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_filter_input_takes_characters() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_filter_input_action(&key(KeyCode::Char('q'))),
            Some(Action::FilterInput('q'))
        );
        assert_eq!(
            kb.get_filter_input_action(&key(KeyCode::Esc)),
            Some(Action::FilterCancel)
        );
        assert_eq!(
            kb.get_filter_input_action(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(Action::FilterClearInput)
        );
        // Function keys still reach the global table
        assert_eq!(
            kb.get_filter_input_action(&key(KeyCode::F(4))),
            Some(Action::ClearFilter)
        );
    }
}
