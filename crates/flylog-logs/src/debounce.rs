use std::time::{Duration, Instant};

/// Default quiet period before a filter edit is evaluated
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(750);

/// A single cancelable delayed task.
///
/// Scheduling again replaces the pending deadline, so only the last
/// request inside the window fires. Time is passed in by the caller, which
/// lets the event loop use the wall clock and tests use fabricated instants.
#[derive(Clone, Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm the timer relative to `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Drop the pending deadline without firing
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// When the pending task is due (for the event loop's sleep)
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if due. Returns true at most once per schedule.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}
