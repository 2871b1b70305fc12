//! Telegram Viewer - terminal front end
//!
//! `watch` follows one chat live; `fetch` prints what the bot currently
//! has for that chat and exits.

use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use telegram_viewer::client::TelegramClient;
use telegram_viewer::config::Config;
use telegram_viewer::poller::{run_cycle, Poller};
use telegram_viewer::session::{CycleOutcome, Session, Snapshot, ViewState};
use telegram_viewer::{Error, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Telegram Viewer - follow one chat through the Bot API
#[derive(Parser)]
#[command(name = "telegram-viewer")]
#[command(about = "Incrementally poll a Telegram bot and view one chat's messages")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Bot token
    #[arg(long, global = true, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Chat id to show messages from
    #[arg(long, global = true, env = "TELEGRAM_CHAT_ID")]
    chat_id: Option<String>,

    /// Bot API base URL
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Seconds between polls
    #[arg(long, global = true)]
    interval_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow the chat live (commands on stdin: p, n, r, q)
    Watch,

    /// Fetch once, print all messages, and exit
    Fetch,
}

/// A line typed on stdin while watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewCommand {
    Previous,
    Next,
    Refresh,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so stdout stays the view)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&cli.connection)?;

    match cli.command {
        Commands::Watch => cmd_watch(&config).await,
        Commands::Fetch => cmd_fetch(&config).await,
    }
}

fn build_config(args: &ConnectionArgs) -> Result<Config> {
    let mut config = Config::from_env()?;

    if let Some(token) = &args.token {
        config.bot_token = token.trim().to_string();
    }
    if let Some(chat_id) = &args.chat_id {
        config.target_chat_id = chat_id.trim().to_string();
    }
    if let Some(base) = &args.api_base {
        config.api_base = base.clone();
    }
    if let Some(secs) = args.interval_secs {
        config.poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.timeout_secs {
        config.fetch_timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok(config)
}

// ============================================================================
// Commands
// ============================================================================

async fn cmd_watch(config: &Config) -> Result<()> {
    let client = TelegramClient::new(config)?;
    let handle = Poller::new(client, config).start();
    let mut changed = handle.subscribe();
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut last_rendered = String::new();
    let mut stdin_open = true;

    info!("Watching chat {} (p = previous, n = next, r = refresh, q = quit)", config.target_chat_id);

    loop {
        let snapshot = handle.snapshot().await;
        let rendered = render(&snapshot, &config.target_chat_id);
        if rendered != last_rendered {
            println!("{}", rendered);
            last_rendered = rendered;
        }

        tokio::select! {
            result = changed.changed() => {
                if result.is_err() {
                    error!("Poller exited");
                    break;
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match parse_command(&line) {
                        Some(ViewCommand::Previous) => { handle.previous().await; }
                        Some(ViewCommand::Next) => { handle.next().await; }
                        Some(ViewCommand::Refresh) => handle.refresh(),
                        Some(ViewCommand::Quit) => break,
                        None => debug!("Ignoring input: {:?}", line),
                    },
                    // EOF: keep following without input
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn cmd_fetch(config: &Config) -> Result<()> {
    let client = TelegramClient::new(config)?;
    let session = Arc::new(Mutex::new(Session::new(&config.target_chat_id)));

    let outcome = run_cycle(&client, &session, config.batch_limit, config.fetch_timeout).await;
    if let CycleOutcome::Failed(reason) = outcome {
        return Err(Error::Fetch(reason));
    }

    let snapshot = session.lock().await.snapshot();
    if snapshot.messages.is_empty() {
        println!("{}", render(&snapshot, &config.target_chat_id));
    }
    for (i, message) in snapshot.messages.iter().enumerate() {
        println!(
            "[{}/{}] {} · {}\n{}\n",
            i + 1,
            snapshot.messages.len(),
            message.sender,
            message.display_date,
            message.text
        );
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_command(line: &str) -> Option<ViewCommand> {
    match line.trim().to_lowercase().as_str() {
        "p" | "prev" | "previous" => Some(ViewCommand::Previous),
        "n" | "next" => Some(ViewCommand::Next),
        "r" | "refresh" => Some(ViewCommand::Refresh),
        "q" | "quit" | "exit" => Some(ViewCommand::Quit),
        _ => None,
    }
}

/// Render the current view as a text card
fn render(snapshot: &Snapshot, chat_id: &str) -> String {
    match snapshot.view() {
        ViewState::Loading => "Loading...".to_string(),
        ViewState::Error(error) => format!("{}\nCheck the bot token and chat id", error),
        ViewState::Empty => format!("No messages from this chat\nChat ID: {}", chat_id),
        ViewState::Showing {
            message,
            position,
            total,
        } => {
            let prev = if position > 0 { "◄" } else { " " };
            let next = if position + 1 < total { "►" } else { " " };
            format!(
                "{} [{}/{}] {} · {} {}\n\n{}\n",
                prev,
                position + 1,
                total,
                message.sender,
                message.display_time(),
                next,
                message.text
            )
        }
    }
}
