mod cli;
mod config;
mod error;
mod ingest;
mod llm;
mod session;

use std::io;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::config::Config;
use crate::session::registry::SessionRegistry;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Args, Clone)]
struct ChatArgs {
    /// Question to ask once, without starting the interactive prompt
    #[arg(short, long)]
    input: Option<String>,

    /// Document (.txt or .pdf) to load before chatting
    #[arg(short, long)]
    document: Option<String>,

    /// Name of the session to start in
    #[arg(short, long, default_value = "default")]
    session: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat(ChatArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    // Default to chat if no subcommand is provided
    let args = match cli.command {
        Some(Commands::Chat(args)) => args,
        None => cli.chat,
    };

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting DocuMind");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("Failed to load configuration: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let answers = match llm::from_config(&config) {
        Ok(answers) => answers,
        Err(e) => {
            eprintln!("Failed to initialize {} client: {}", config.provider, e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("Using {}", answers.describe());

    let registry = SessionRegistry::new(answers, config.max_document_chars);
    let interactive = args.input.is_none();

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        args.input,
        interactive,
        registry,
        args.session,
    );
    chat_context.run(args.document).await
}
