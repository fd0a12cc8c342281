use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use flylog_logs::LogStore;
use flylog_source::{FileSource, Ingest, RecordSender, UdpOptions, UdpSource, check_input};
use flylog_tui::{
    AppState, Event, EventHandler, KeyBindings, KeyContext, LogViewerScreen, Mode, Settings, Tui,
};
use flylog_types::SequenceCounter;

/// Ingest messages applied per loop iteration before the next render
const MAX_INGEST_PER_FRAME: usize = 1024;

/// flylog - follow a UDP log stream or a log file in the terminal
#[derive(Parser, Debug)]
#[command(name = "flylog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log server IP or host name
    #[arg(long)]
    ip: Option<String>,

    /// Log server UDP port
    #[arg(long)]
    port: Option<u16>,

    /// Read records from a file instead of subscribing to a server
    #[arg(short = 'I', long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Config file (defaults to the per-user flylog/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    // Run the application
    match run_app(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run_app(args: Args) -> Result<()> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(ip) = args.ip {
        settings.host = ip;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }

    // Fail before the terminal is taken over
    if let Some(path) = &args.input {
        check_input(path)?;
    }

    let counter = SequenceCounter::new();
    let cancel = CancellationToken::new();
    let (ingest_tx, mut ingest_rx) = mpsc::unbounded_channel::<Ingest>();

    let (mode, udp) = match args.input {
        Some(path) => {
            FileSource::new(path.clone(), settings.batch_size, settings.max_line_bytes).spawn(
                counter.clone(),
                ingest_tx,
                cancel.clone(),
            );
            (Mode::File { path }, None)
        }
        None => {
            let options = UdpOptions {
                heartbeat_interval: settings.heartbeat_interval(),
                stale_after: settings.stale_after(),
            };
            let source = UdpSource::start(
                &settings.server_addr(),
                options,
                RecordSender::new(ingest_tx, counter.clone()),
            )
            .await
            .context("Failed to start UDP client")?;
            let server = source.server().to_string();
            (Mode::Online { server }, Some(source))
        }
    };

    let store = LogStore::new(settings.debounce(), &settings.correlation_marker);
    let mut state = AppState::new(mode, store, settings.auto_scroll);

    // Initialize TUI
    let mut tui = Tui::new().context("Failed to initialize terminal")?;
    let mut events = EventHandler::new();
    let keybindings = KeyBindings::new();

    render(&mut tui, &mut state)?;

    // Main event loop: the only place the store is touched
    loop {
        let deadline = state.next_deadline();

        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = match state.key_context() {
                            KeyContext::FilterInput => keybindings.get_filter_input_action(&key),
                            context => keybindings.get_action(context, &key),
                        };
                        if let Some(action) = action {
                            state.handle_action(action, Instant::now());
                        }
                    }
                    Event::Resize(_, _) => {
                        state.render_dirty = true;
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            // Handle records and source notifications
            Some(msg) = ingest_rx.recv() => {
                apply_ingest(&mut state, msg);
                for _ in 1..MAX_INGEST_PER_FRAME {
                    match ingest_rx.try_recv() {
                        Ok(msg) => apply_ingest(&mut state, msg),
                        Err(_) => break,
                    }
                }
            }

            // Filter debounce
            _ = wait_until(deadline) => {
                state.tick(Instant::now());
            }
        }

        if state.should_quit {
            break;
        }

        if state.render_dirty {
            render(&mut tui, &mut state)?;
        }
    }

    // Cleanup
    cancel.cancel();
    if let Some(source) = udp {
        source.shutdown().await;
    }
    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn apply_ingest(state: &mut AppState, msg: Ingest) {
    match msg {
        Ingest::Record(record) => state.apply_record(record),
        Ingest::Batch(batch) => state.apply_batch(batch),
        Ingest::Connection(connection) => state.set_connection(connection),
        Ingest::EndOfInput => state.finish_input(),
        Ingest::Failed(error) => state.show_error(error),
    }
}

/// Sleep until the debounce deadline, or forever when none is pending
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal()
        .draw(|frame| LogViewerScreen::render(frame, state))?;
    state.render_dirty = false;
    Ok(())
}
