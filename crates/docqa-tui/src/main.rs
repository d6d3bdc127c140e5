use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use ratatui::Terminal;
use ratatui::crossterm::event;
use ratatui::crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;
use tokio::sync::mpsc;

use docqa_core::{Config, Gateway, InferenceClient, StorageBackend, config_file};

mod action;
mod app;
mod backend;
mod input;
mod logging;
mod model;
mod theme;
mod tui_event;
mod view;

use app::App;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// DocQA: open PDFs and ask questions about them from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// PDF files to open at startup
    pdf_paths: Vec<PathBuf>,

    /// Inference endpoint URL (multipart `file` + `prompt`)
    #[arg(long)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Where uploads are mirrored: local, http, memory or none
    #[arg(long)]
    storage: Option<String>,

    /// Directory for the local blob store
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Base URL for the HTTP blob store
    #[arg(long)]
    storage_url: Option<String>,

    /// Color theme: hacker (default) or modern
    #[arg(long)]
    theme: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Resolve config from CLI flags > env vars > config files > defaults.
fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    let mut config = Config::default();
    config_file::apply_to_config(&config_file::load_config(), &mut config)?;
    config_file::apply_env(&mut config)?;

    if let Some(url) = &args.endpoint {
        config.endpoint_url = url.clone();
    }
    if let Some(secs) = args.timeout {
        config.request_timeout = Duration::from_secs(secs.max(1));
    }
    let dir = args.storage_dir.as_ref().map(|d| d.display().to_string());
    if let Some(backend) = &args.storage {
        config.storage =
            config_file::parse_storage(backend, dir.as_deref(), args.storage_url.as_deref())?;
    } else if let Some(dir) = &args.storage_dir {
        config.storage = StorageBackend::Local(dir.clone());
    } else if let Some(url) = &args.storage_url {
        config.storage = StorageBackend::Http(url.clone());
    }
    if let Some(theme) = &args.theme {
        config.theme = theme.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Validate any PDF paths provided on the command line
    for path in &args.pdf_paths {
        if !path.is_file() {
            anyhow::bail!("PDF file not found: {}", path.display());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        docqa_core::gateway::validate_pdf_name(&name)?;
    }

    let config = resolve_config(&args)?;

    let (activity_tx, mut activity_rx) = mpsc::unbounded_channel();
    let _log_guard = logging::init(args.verbose, activity_tx)?;
    tracing::info!(
        endpoint = %config.endpoint_url,
        storage = config.storage.label(),
        "starting docqa"
    );

    let store = config.build_blob_store()?;
    let gateway = Arc::new(Gateway::new(store)?);
    let client: Arc<dyn InferenceClient> = Arc::new(config.build_inference()?);

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    // Install panic hook that restores terminal before printing panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableBracketedPaste
        );
        original_hook(panic_info);
    }));

    let backend_terminal = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend_terminal)?;

    // Drain any stray input events (e.g. Enter keypress from launching the command)
    while event::poll(Duration::from_millis(50)).unwrap_or(false) {
        let _ = event::read();
    }

    let mut app = App::new(config);

    // Set up backend channels
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<tui_event::BackendCommand>();
    app.backend_cmd_tx = Some(cmd_tx);
    tokio::spawn(backend::run(
        cmd_rx,
        event_tx,
        Arc::clone(&gateway),
        client,
    ));

    app.open_paths(args.pdf_paths.clone());

    // Also handle Ctrl+C at the OS level for clean shutdown
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    // Main event loop
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|f| app.view(f))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                if let Some(backend_event) = maybe_event {
                    app.handle_backend_event(backend_event);
                    // Drain any additional queued backend events
                    while let Ok(evt) = event_rx.try_recv() {
                        app.handle_backend_event(evt);
                    }
                }
            }
            Some(entry) = activity_rx.recv() => {
                app.activity.push(entry);
                while let Ok(entry) = activity_rx.try_recv() {
                    app.activity.push(entry);
                }
            }
            _ = &mut ctrl_c => {
                app.should_quit = true;
            }
            // Terminal input events
            _ = async {
                if event::poll(tick_rate).unwrap_or(false)
                    && let Ok(evt) = event::read()
                {
                    let action = input::map_event(&evt, &app.input_mode);
                    app.update(action);
                }
            } => {}
        }

        app.update(action::Action::Tick);

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;

    // Stop accepting commands; give pending mirror uploads a moment to land
    app.backend_cmd_tx = None;
    if tokio::time::timeout(Duration::from_secs(5), gateway.flush_mirrors())
        .await
        .is_err()
    {
        tracing::warn!("gave up waiting for mirror uploads");
    }

    Ok(())
}
