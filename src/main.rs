use clap::{Parser, Subcommand};
use guide_chat::Result;
use guide_chat::commands::{ask, chat, init_index, show_status};
use guide_chat::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "guide-chat")]
#[command(about = "A retrieval-augmented chat assistant for game guides")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure endpoints, models, and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Build the vector index from a guide corpus
    Init {
        /// Path to the corpus CSV file
        corpus: PathBuf,
        /// Rebuild the index even if it already holds documents
        #[arg(long)]
        force: bool,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question to answer
        question: String,
        /// Print the retrieved context before the answer
        #[arg(long)]
        show_context: bool,
    },
    /// Start an interactive chat session
    Chat {
        /// Print the retrieved context before each answer
        #[arg(long)]
        show_context: bool,
    },
    /// Show the health of the configured backends
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Init { corpus, force } => {
            init_index(corpus, force).await?;
        }
        Commands::Ask {
            question,
            show_context,
        } => {
            ask(question, show_context).await?;
        }
        Commands::Chat { show_context } => {
            chat(show_context).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
