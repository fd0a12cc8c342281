use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use flylog_types::{ConnectionState, Level};

use crate::error::{Result, SourceError};
use crate::event::RecordSender;
use crate::monitor::{ConnectionMonitor, Transition};
use crate::protocol::{Datagram, HEARTBEAT, MAX_DATAGRAM};

/// Timing of the UDP subscription
#[derive(Clone, Copy, Debug)]
pub struct UdpOptions {
    pub heartbeat_interval: Duration,
    pub stale_after: Duration,
}

impl Default for UdpOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: crate::monitor::DEFAULT_HEARTBEAT_INTERVAL,
            stale_after: crate::monitor::DEFAULT_STALE_AFTER,
        }
    }
}

/// Realtime source: subscribes to a log server over UDP.
///
/// Runs a heartbeat task (owns the [`ConnectionMonitor`]) and a receive
/// task. Acknowledgments travel from the receive task to the heartbeat
/// task over a channel, so the monitor has a single writer.
pub struct UdpSource {
    /// Cancellation token for stopping both tasks
    cancel: CancellationToken,

    /// Active task handles
    tasks: Vec<tokio::task::JoinHandle<()>>,

    /// Resolved server address
    server: SocketAddr,
}

impl UdpSource {
    /// Resolve the server, bind an ephemeral local socket and start both tasks
    pub async fn start(server_addr: &str, options: UdpOptions, sender: RecordSender) -> Result<Self> {
        let server = tokio::net::lookup_host(server_addr)
            .await
            .map_err(|e| SourceError::Resolve {
                addr: server_addr.to_string(),
                reason: e.to_string(),
            })?
            .next()
            .ok_or_else(|| SourceError::Resolve {
                addr: server_addr.to_string(),
                reason: "no addresses found".to_string(),
            })?;

        let bind_addr: SocketAddr = if server.is_ipv6() {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv4Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(SourceError::Bind)?;
        let local = socket.local_addr()?;
        let socket = Arc::new(socket);

        tracing::info!(%server, %local, "udp source started");
        sender.status(Level::Info, &format!("Connecting to {}", server));

        let cancel = CancellationToken::new();
        let (ack_tx, ack_rx) = mpsc::unbounded_channel();

        let heartbeat = tokio::spawn(heartbeat_loop(
            Arc::clone(&socket),
            server,
            local,
            options,
            ack_rx,
            sender.clone(),
            cancel.clone(),
        ));
        let receive = tokio::spawn(receive_loop(socket, ack_tx, sender, cancel.clone()));

        Ok(Self {
            cancel,
            tasks: vec![heartbeat, receive],
            server,
        })
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    /// Stop both tasks. The receive task reports a clean close.
    pub fn stop(&mut self) {
        self.cancel.cancel();
    }

    /// Stop and wait for both tasks to finish
    pub async fn shutdown(mut self) {
        self.stop();
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}

impl Drop for UdpSource {
    fn drop(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

async fn heartbeat_loop(
    socket: Arc<UdpSocket>,
    server: SocketAddr,
    local: SocketAddr,
    options: UdpOptions,
    mut ack_rx: mpsc::UnboundedReceiver<Instant>,
    sender: RecordSender,
    cancel: CancellationToken,
) {
    let mut monitor = ConnectionMonitor::new(options.stale_after, Instant::now());
    let mut ticker = tokio::time::interval(options.heartbeat_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let transitions: Vec<Transition> = tokio::select! {
            biased;

            _ = cancel.cancelled() => break,

            Some(at) = ack_rx.recv() => monitor.on_ack(at).into_iter().collect(),

            _ = ticker.tick() => {
                if let Err(e) = socket.send_to(HEARTBEAT, server).await {
                    tracing::warn!(error = %e, "heartbeat send failed");
                    sender.status(Level::Warn, &format!("SUB send error: {}", e));
                }
                heartbeat_tick(&mut monitor, &mut ack_rx, Instant::now())
            }
        };

        for transition in transitions {
            if !report_transition(transition, &sender, server, local) {
                return;
            }
        }
    }
}

/// Apply pending acks, then the stale check
fn heartbeat_tick(
    monitor: &mut ConnectionMonitor,
    ack_rx: &mut mpsc::UnboundedReceiver<Instant>,
    now: Instant,
) -> Vec<Transition> {
    let mut transitions = Vec::new();
    while let Ok(at) = ack_rx.try_recv() {
        transitions.extend(monitor.on_ack(at));
    }
    transitions.extend(monitor.on_tick(now));
    transitions
}

/// Emit the connection change and its status record.
/// Returns false once the receiver is gone.
fn report_transition(
    transition: Transition,
    sender: &RecordSender,
    server: SocketAddr,
    local: SocketAddr,
) -> bool {
    match transition {
        Transition::Connected { first } => {
            tracing::info!(%server, first, "server acknowledged");
            let text = if first {
                format!("Connected. Local: {}, Server: {}", local, server)
            } else {
                format!("Reconnected to {}", server)
            };
            sender.connection(ConnectionState::Connected) && sender.status(Level::Info, &text)
        }
        Transition::Disconnected { warn } => {
            tracing::warn!(%server, "server went silent");
            let mut alive = sender.connection(ConnectionState::Disconnected);
            if warn {
                alive &= sender.status(Level::Warn, &format!("Lost connection to {}", server));
            }
            alive
        }
    }
}

/// Report a failed read as a record; reading continues while the
/// receiver is alive
fn report_read_error(sender: &RecordSender, error: &std::io::Error) -> bool {
    tracing::debug!(%error, "udp read failed");
    sender.line(&format!("[ERROR] UDP read: {}", error))
}

async fn receive_loop(
    socket: Arc<UdpSocket>,
    ack_tx: mpsc::UnboundedSender<Instant>,
    sender: RecordSender,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                sender.line("[INFO] UDP connection closed");
                break;
            }

            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((n, _from)) => match Datagram::classify(&buf[..n]) {
                        Datagram::Ack => {
                            let _ = ack_tx.send(Instant::now());
                        }
                        Datagram::Line(line) => {
                            if !sender.line(&line) {
                                break;
                            }
                        }
                    },
                    Err(e) => {
                        if !report_read_error(&sender, &e) {
                            break;
                        }
                    }
                }
            }
        }
    }
}
