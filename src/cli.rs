use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sibyl",
    version,
    about = "Tool-using Ollama agent with local document retrieval"
)]
pub struct Cli {
    /// Path to the configuration file (default: config/sibyl.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override the Ollama endpoint from config
    #[arg(long)]
    pub ollama_url: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive chat with the agent
    Chat {
        /// Enable the reflection pass regardless of config
        #[arg(long)]
        reflection: bool,
        /// Disable the reflection pass regardless of config
        #[arg(long, conflicts_with = "reflection")]
        no_reflection: bool,
        /// Override the iteration bound for the tool loop
        #[arg(long)]
        max_iters: Option<usize>,
    },
    /// Run a single prompt through the agent and print JSON
    Ask {
        /// Override the system prompt
        #[arg(long)]
        system: Option<String>,
        prompt: Vec<String>,
    },
    /// Ingest documents into the vector index
    Ingest {
        /// Folder to ingest (default: the configured docs dir)
        #[arg(long)]
        folder: Option<PathBuf>,
    },
    /// Query the vector index directly and print JSON results
    Query {
        #[arg(long)]
        q: String,
        #[arg(long, default_value_t = 5)]
        k: usize,
    },
}
