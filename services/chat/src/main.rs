use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing_subscriber::fmt::time::ChronoLocal;
use trip_assistant_chat::config::{Config, WELCOME_PROBE_TIMEOUT};
use trip_assistant_chat::http_adapter::HttpDialogueService;
use trip_assistant_chat::terminal::{self, LineAction, TerminalRenderer};
use trip_assistant_core::{Command, Controller, ConversationStore, InputMode, UserEvent};

#[derive(Parser)]
#[command(version, about = "Terminal client for the Trip-Assistant dialogue service")]
struct Cli {
    /// Base URL of the dialogue service (overrides TRIP_ASSISTANT_URL)
    #[arg(long)]
    url: Option<String>,
    /// Session identifier sent with every query (overrides TRIP_ASSISTANT_USER_ID)
    #[arg(long)]
    user_id: Option<String>,
    /// Do not probe the service greeting at startup
    #[arg(long)]
    skip_welcome: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 2. Load Configuration ---
    let config = Config::from_env()
        .and_then(|config| config.with_overrides(args.url, args.user_id))
        .context("Failed to load application configuration")?;

    // --- 3. Initialize Logging ---
    // Logs go to stderr so they never interleave with the transcript on stdout.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "Configuration loaded. Talking to {} as '{}'.",
        config.base_url,
        config.user_id
    );

    // --- 4. Initialize the Dialogue Service Client ---
    let client = dialogue_client::Client::new(
        dialogue_client::Config::builder()
            .with_base_url(&config.base_url)
            .with_timeout(config.request_timeout)
            .build(),
    )
    .context("Failed to create the dialogue service client")?;

    if !args.skip_welcome {
        match tokio::time::timeout(WELCOME_PROBE_TIMEOUT, client.welcome()).await {
            Ok(Ok(welcome)) => tracing::info!("Service says: {}", welcome.message()),
            Ok(Err(e)) => tracing::warn!("Dialogue service is not answering yet: {}", e),
            Err(_) => tracing::warn!(
                "Dialogue service did not greet within {:?}",
                WELCOME_PROBE_TIMEOUT
            ),
        }
    }

    // --- 5. Application Setup ---
    // User events flow into the controller, render commands flow out of it.
    let (event_tx, event_rx) = mpsc::channel::<UserEvent>(32);
    let (command_tx, mut command_rx) = mpsc::channel::<Command>(32);
    // The input thread needs the current mode to know whether "1"/"2" are option keys.
    let (mode_tx, mode_rx) = watch::channel(InputMode::FreeText);
    let (quit_tx, quit_rx) = oneshot::channel::<()>();

    // This task draws every snapshot the controller emits.
    let render_handle = tokio::spawn(async move {
        let mut renderer = TerminalRenderer::new(std::io::stdout());
        while let Some(command) = command_rx.recv().await {
            match command {
                Command::Render(view) => {
                    mode_tx.send_replace(view.mode);
                    if let Err(e) = renderer.render(&view) {
                        tracing::error!("Failed to draw transcript: {}", e);
                        break;
                    }
                }
            }
        }
    });

    // Stdin is read on a plain thread so a pending read never holds up shutdown.
    let stats_client = client.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            };
            let mode = *mode_rx.borrow();
            match terminal::parse_line(&line, mode) {
                LineAction::Send(event) => {
                    if event_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                LineAction::Stats => {
                    if let Err(e) =
                        terminal::write_stats(&mut std::io::stdout(), &stats_client.stats())
                    {
                        tracing::warn!("Failed to print stats: {}", e);
                    }
                }
                LineAction::Quit => {
                    let _ = quit_tx.send(());
                    return;
                }
            }
        }
        // End of input: dropping `event_tx` lets the controller drain and finish.
        tracing::debug!("stdin closed");
    });

    let service = Arc::new(HttpDialogueService::new(client));
    let controller = Controller::new(ConversationStore::new(config.user_id.clone()), service);

    tokio::select! {
        store = controller.run(event_rx, command_tx) => {
            tracing::info!("Session ended with {} messages.", store.transcript().len());
        }
        Ok(()) = quit_rx => {
            tracing::info!("Leaving the session.");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl-C, shutting down...");
        }
    }

    // The controller is gone, so the command channel closes and the last renders flush.
    if let Err(e) = render_handle.await {
        tracing::error!("Render task failed: {:?}", e);
    }
    tracing::info!("Shutting down...");
    Ok(())
}
