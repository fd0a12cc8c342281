mod log_viewer;

pub use log_viewer::{LogViewerScreen, status_text};
