/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,

    // UI toggles
    ToggleHelp,
    ToggleAutoScroll,

    // Filter input
    FocusFilter,
    FilterInput(char),
    FilterBackspace,
    FilterClearInput,
    FilterConfirm,
    FilterCancel,

    // Record set
    ClearFilter,
    ClearAll,

    // Log table navigation
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
}
