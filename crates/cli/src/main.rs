//! Quill CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config directory
//! - `ask`     — Send a single message
//! - `chat`    — Interactive conversation mode
//! - `status`  — Show configuration and model daemon health

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quill",
    about = "Quill — a context-aware personal assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,
    },

    /// Enter interactive conversation mode
    Chat,

    /// Show configuration and model daemon health
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { message } => commands::chat::run_once(&message).await?,
        Commands::Chat => commands::chat::run_interactive().await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
