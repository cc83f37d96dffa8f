//! Lynn CLI entry point

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lynn::adapters::http::HttpChannel;
use lynn::adapters::telegram::TelegramChannel;
use lynn::adapters::terminal::TerminalChannel;
use lynn::adapters::Channel;
use lynn::chat::{default_system_instruction, Session, SessionManager};
use lynn::config::Config;
use lynn::knowledge::KnowledgeBase;
use lynn::llm::{CompletionClient, OpenAiClient};
use lynn::ui;

#[derive(Parser)]
#[command(name = "lynn")]
#[command(about = "🧪 Lynn - A drug delivery AI for tumor targeting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with Lynn in the terminal
    Chat {
        /// Single message to send instead of the interactive loop
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Serve the HTTP chat endpoint
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Bridge a Telegram bot into the same chat sessions
    Gateway,

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Setup global Ctrl+C handler
    let exit_flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let r = exit_flag.clone();

    ctrlc::set_handler(move || {
        if r.load(std::sync::atomic::Ordering::SeqCst) {
            println!("\n👋 Bye!");
            std::process::exit(0);
        } else {
            println!("\n⚠️  Press Ctrl+C again to exit");
            r.store(true, std::sync::atomic::Ordering::SeqCst);

            // Reset flag after 3 seconds
            let r2 = r.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_secs(3));
                r2.store(false, std::sync::atomic::Ordering::SeqCst);
            });
        }
    })
    .ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { message } => {
            let config = Config::from_env()?;
            let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_path)?);
            let client = OpenAiClient::new(&config.api_key, &config.base_url, &config.model);

            if let Some(msg) = message {
                // Single message mode
                let session = Session::new(client, default_system_instruction(), knowledge);
                let mut channel = TerminalChannel::new(session);
                let reply = channel.run_once(&msg).await?;
                println!("\n🧪 {}", reply);
            } else {
                // Interactive mode
                ui::print_header(client.model());
                let session = Session::new(client, default_system_instruction(), knowledge);
                let mut channel = TerminalChannel::new(session);
                channel.run_interactive().await?;
            }
        }

        Commands::Serve { port } => {
            let config = Config::from_env()?;
            let sessions = session_manager(&config)?;
            let channel = HttpChannel::new(port, sessions);

            ui::print_step(&format!("Starting Lynn HTTP server on port {}", port));
            ui::print_success("Chat endpoint ready at POST /api/chat");
            channel.start().await?;
        }

        Commands::Gateway => {
            let config = Config::from_env()?;
            if !config.telegram.enabled() {
                ui::print_error("TELEGRAM_BOT_TOKEN not set. The gateway needs a bot token.");
                return Err(lynn::Error::Config(
                    "TELEGRAM_BOT_TOKEN not set. The gateway needs a bot token.".to_string(),
                )
                .into());
            }

            let sessions = session_manager(&config)?;
            let channel = TelegramChannel::new(config.telegram.clone(), sessions);

            ui::print_success("Gateway started. Listening for Telegram messages...");
            channel.start().await?;
        }

        Commands::Status => {
            let config = Config::from_env()?;
            let knowledge = KnowledgeBase::load(&config.knowledge_path)?;

            println!("🧪 Lynn Status\n");
            ui::print_success("API key configured");
            ui::print_step(&format!("Model: {}", config.model));
            ui::print_step(&format!("Base URL: {}", config.base_url));
            if knowledge.is_empty() {
                ui::print_warning("Knowledge base is empty");
            } else {
                ui::print_step(&format!("Knowledge base: {} entries", knowledge.len()));
            }
            ui::print_step(&format!(
                "Telegram: {}",
                if config.telegram.enabled() { "enabled" } else { "disabled" }
            ));
        }
    }

    Ok(())
}

fn session_manager(config: &Config) -> Result<Arc<SessionManager<OpenAiClient>>> {
    let knowledge = Arc::new(KnowledgeBase::load(&config.knowledge_path)?);
    let client = OpenAiClient::new(&config.api_key, &config.base_url, &config.model);
    Ok(Arc::new(SessionManager::new(
        client,
        default_system_instruction(),
        knowledge,
    )))
}
