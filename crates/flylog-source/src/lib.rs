//! Input sources for flylog
//!
//! This crate provides the realtime UDP subscription and the bulk file
//! reader. Both hand records to the presentation thread as [`Ingest`]
//! messages over a tokio channel.

mod error;
mod event;
mod file;
mod monitor;
mod protocol;
mod udp;

pub use error::{Result, SourceError};
pub use event::{Ingest, RecordSender, status_line};
pub use file::{DEFAULT_MAX_LINE_BYTES, FileSource, check_input};
pub use monitor::{ConnectionMonitor, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_STALE_AFTER, Transition};
pub use protocol::{ACK_PREFIX, Datagram, HEARTBEAT, MAX_DATAGRAM};
pub use udp::{UdpOptions, UdpSource};
