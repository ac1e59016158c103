//! chatbot-cli - Lightweight CLI client for hosted chatbot widgets
//!
//! Fetches chatbot branding/settings from the remote chat API, sends
//! messages in synchronous or asynchronous protocol mode, and runs an
//! interactive conversation session.

mod api;
mod config;
mod conversation;
mod models;
mod repl;
mod service;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::HttpChatApi;
use config::Config;
use service::ChatService;

#[derive(Parser)]
#[command(name = "chatbot-cli")]
#[command(about = "Lightweight CLI client for hosted chatbot widgets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show chatbot name and description
    Info,

    /// Show widget settings (styles, scripted openers, placeholder text)
    Settings,

    /// Send a single message and print the reply
    Send {
        /// Message content
        message: String,
    },

    /// Start an interactive chat session
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load()?;
    let api = Arc::new(HttpChatApi::new(&config));
    let service = ChatService::new(api, config.protocol_mode);

    match cli.command {
        Commands::Info => {
            info(&service).await?;
        }
        Commands::Settings => {
            settings(&service).await?;
        }
        Commands::Send { message } => {
            send_once(&service, &message).await?;
        }
        Commands::Chat => {
            repl::run(service).await?;
        }
    }

    Ok(())
}

async fn info(service: &Arc<ChatService>) -> Result<()> {
    let metadata = service.fetch_chatbot_metadata().await?;
    println!(
        "Name: {}",
        metadata.name.as_deref().unwrap_or(service::FALLBACK_NAME)
    );
    if let Some(description) = metadata.description {
        println!("Description: {}", description);
    }
    Ok(())
}

async fn settings(service: &Arc<ChatService>) -> Result<()> {
    let settings = service.fetch_chat_settings().await?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// One-shot send. In async mode the reply arrives via the resolution
/// channel; wait for the broadcast that matches the placeholder id.
async fn send_once(service: &Arc<ChatService>, message: &str) -> Result<()> {
    let mut resolutions = service.subscribe();
    let reply = service.send_message(message).await?;

    if reply.pending {
        tracing::info!("Reply pending, waiting for resolution...");
        loop {
            let resolved = resolutions.recv().await?;
            if resolved.id == reply.id {
                println!("{}", resolved.content);
                break;
            }
        }
    } else {
        println!("{}", reply.content);
    }

    Ok(())
}
