//! # StyleVault Shell Entry Point
//!
//! A line-oriented storefront over stdin, driving one cart/checkout session.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Shell Startup                                     │
//! │                                                                         │
//! │  1. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info,vault=debug, override with RUST_LOG                 │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • vault.toml (VAULT_CONFIG or platform config dir) + VAULT_* env    │
//! │                                                                         │
//! │  3. Initialize State ─────────────────────────────────────────────────► │
//! │     • InMemoryBackend with the fixture catalog                          │
//! │     • CartStore + CheckoutSession sharing one ChannelSink               │
//! │                                                                         │
//! │  4. Spawn Notification Printer ───────────────────────────────────────► │
//! │     • Drains the sink so toasts from timers show up between prompts     │
//! │                                                                         │
//! │  5. Read-Eval-Print Loop until `quit` or EOF                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod error;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vault_core::Icon;
use vault_session::{ChannelSink, InMemoryBackend, Notification, NotificationLevel, SessionConfig};

use crate::commands::Command;
use crate::state::{Outcome, ShellState};

#[tokio::main]
async fn main() {
    init_tracing();

    let config_path = std::env::var("VAULT_CONFIG").ok().map(PathBuf::from);
    let config = SessionConfig::load_or_default(config_path);
    info!(theme = %config.display.theme, "Starting StyleVault shell");

    let (sink, notifications) = ChannelSink::new();
    let printer = tokio::spawn(print_notifications(notifications));

    let state = ShellState::new(config, Arc::new(InMemoryBackend::new()), Arc::new(sink));

    println!("{} StyleVault. Type 'help' for commands.", Icon::ShoppingBag);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin");
                break;
            }
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match state.execute(command).await {
            Ok(Outcome::Print(out)) => println!("{}", out),
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("{}", e),
        }
    }

    state.shutdown();
    drop(state);
    printer.abort();
    info!("Shell stopped");
}

/// Prints toasts as they arrive.
async fn print_notifications(mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        let icon = match notification.level {
            NotificationLevel::Success => Icon::CheckCircle,
            NotificationLevel::Info => Icon::Shield,
            NotificationLevel::Error => Icon::X,
        };
        println!("{} {}", icon, notification.message);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vault_session=trace` - Trace the session crate only
/// - Default: INFO, DEBUG for the vault crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vault=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
