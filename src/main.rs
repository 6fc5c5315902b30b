//! Bingo Caller - terminal front end
//!
//! Reads commands from stdin and drives a [`Session`].

use anyhow::Result;
use bingo_caller::commands::{parse_command, HELP};
use bingo_caller::config::JsonSettingsStore;
use bingo_caller::narration::create_narrator;
use bingo_caller::session::{Session, SessionCommand, SessionEvent};
use bingo_caller::terminal::{system_prefers_dark, TerminalRenderer};
use bingo_caller::wake_lock::InhibitWakeLock;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Speech backend: system, speechd_ng or silent
    #[arg(short, long, default_value = "system")]
    narrator: String,

    /// Seed the draw order for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Keep the machine awake while a game is running
    #[arg(long)]
    keep_awake: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they never tear the board on stdout
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🎱 Bingo Caller v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = match args.settings {
        Some(path) => JsonSettingsStore::new(path),
        None => JsonSettingsStore::default(),
    };
    info!("📁 Settings: {}", store.path().display());

    let narrator = create_narrator(&args.narrator).await;
    let voices = narrator.voices().await;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = Session::new(
        Box::new(store),
        Box::new(TerminalRenderer::stdout()),
        narrator,
        tx.clone(),
    )
    .with_system_theme(system_prefers_dark());
    if let Some(seed) = args.seed {
        session = session.with_seed(seed);
    }
    if args.keep_awake {
        session = session.with_wake_lock(Box::new(InhibitWakeLock::new()));
    }

    session.initialize();
    session.set_available_voices(voices);

    tokio::spawn(read_commands(tx.clone()));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Interrupted");
            let _ = tx.send(SessionCommand::Quit.into());
        }
    });

    println!("Type 'help' for commands, <enter> to start or pause.");
    session.run(rx).await;
    Ok(())
}

/// Forward stdin lines to the session until EOF
async fn read_commands(tx: UnboundedSender<SessionEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("⚠️ Could not read input: {}", e);
                break;
            }
        };

        if line.trim().eq_ignore_ascii_case("help") {
            println!("{}", HELP);
            continue;
        }

        match parse_command(&line) {
            Ok(command) => {
                if tx.send(command.into()).is_err() {
                    return;
                }
            }
            Err(e) => println!("{} (type 'help')", e),
        }
    }

    debug!("Input closed");
    let _ = tx.send(SessionCommand::Quit.into());
}
