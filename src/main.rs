use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use intervu::app;
use intervu::backend::BackendClient;
use intervu::config::Config;
use intervu::gemini::GeminiClient;
use intervu::ui::conversation::ConversationManager;

#[derive(Parser)]
#[command(name = "intervu")]
#[command(version)]
#[command(about = "AI interview practice in your terminal", long_about = None)]
struct Cli {
    /// Chat identifier of the interview session
    chat_id: String,

    /// User identifier owning the chat
    #[arg(long)]
    user: String,

    /// Override the backend base URL
    #[arg(long)]
    backend_url: Option<String>,

    /// Override the Gemini model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    init_logging(&config)?;

    let completion = GeminiClient::new(&config)?;
    let store = BackendClient::new(&config)?;

    let mut manager = ConversationManager::new(completion, store, cli.user, cli.chat_id);
    manager.load().await;

    app::run(manager).await
}

/// Log to a file under the intervu home; stderr belongs to the TUI.
fn init_logging(config: &Config) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("intervu=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
