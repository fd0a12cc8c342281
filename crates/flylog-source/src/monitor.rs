use std::time::{Duration, Instant};

use flylog_types::ConnectionState;

/// Default heartbeat period
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(500);

/// Default silence after which a connected server is considered lost
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(1000);

/// State change reported by the monitor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Disconnected -> Connected. `first` is set for the first connection of the run.
    Connected { first: bool },
    /// Connected -> Disconnected. `warn` is set when the episode has not
    /// been warned about yet.
    Disconnected { warn: bool },
}

/// Liveness state machine for the UDP subscription.
///
/// At most one warning per disconnect episode and exactly one notice per
/// reconnection. Only the heartbeat task drives it.
#[derive(Debug)]
pub struct ConnectionMonitor {
    state: ConnectionState,
    last_ack: Instant,
    warned: bool,
    ever_connected: bool,
    stale_after: Duration,
}

impl ConnectionMonitor {
    pub fn new(stale_after: Duration, now: Instant) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            last_ack: now,
            warned: false,
            ever_connected: false,
            stale_after,
        }
    }

    /// An acknowledgment arrived
    pub fn on_ack(&mut self, now: Instant) -> Option<Transition> {
        self.last_ack = now;

        if self.state == ConnectionState::Connected {
            return None;
        }

        self.state = ConnectionState::Connected;
        self.warned = false;
        let first = !self.ever_connected;
        self.ever_connected = true;
        Some(Transition::Connected { first })
    }

    /// Heartbeat timer tick
    pub fn on_tick(&mut self, now: Instant) -> Option<Transition> {
        let silent = now.saturating_duration_since(self.last_ack);
        if silent <= self.stale_after || self.state != ConnectionState::Connected {
            return None;
        }

        self.state = ConnectionState::Disconnected;
        let warn = !self.warned;
        self.warned = true;
        Some(Transition::Disconnected { warn })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_ack(&self) -> Instant {
        self.last_ack
    }
}
