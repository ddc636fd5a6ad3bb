mod application;
mod cli;
mod config;
mod domain;
mod infrastructure;

use application::agent::{Agent, AgentConfig};
use application::retrieval::RetrievalPipeline;
use application::tooling::Toolbox;
use clap::Parser;
use cli::{Cli, Command};
use config::AppConfig;
use infrastructure::embedding::OllamaEmbedder;
use infrastructure::index::JsonlIndex;
use infrastructure::model::{GenerationOptions, OllamaClient};
use infrastructure::search::SearxClient;
use serde_json::json;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    debug!(?cli.command, config = ?cli.config, "CLI arguments parsed");

    let mut app_config = AppConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.ollama_url {
        app_config.ollama_url = url;
    }

    // Composition root: collaborators are opened once here and injected.
    let index = Arc::new(JsonlIndex::open(&app_config.index_path)?);
    let embedder = Arc::new(OllamaEmbedder::new(
        app_config.ollama_url.clone(),
        app_config.embed_model.clone(),
    ));
    let pipeline = Arc::new(
        RetrievalPipeline::new(embedder, index.clone()).with_chunk_budget(app_config.chunk_words),
    );

    match cli.command {
        Command::Chat {
            reflection,
            no_reflection,
            max_iters,
        } => {
            let mut agent_config = agent_config(&app_config);
            if reflection {
                agent_config.reflection = true;
            }
            if no_reflection {
                agent_config.reflection = false;
            }
            if let Some(max_iters) = max_iters {
                agent_config.max_iters = max_iters;
            }
            let mut agent = build_agent(&app_config, pipeline, agent_config);
            run_repl(&mut agent, &app_config.chat_model).await?;
        }
        Command::Ask { system, prompt } => {
            let prompt = prompt.join(" ").trim().to_string();
            if prompt.is_empty() {
                return Err("prompt required".into());
            }
            let mut agent_config = agent_config(&app_config);
            if let Some(system) = system {
                agent_config.system_prompt = system;
            }
            let mut agent = build_agent(&app_config, pipeline, agent_config);
            info!("Dispatching single prompt");
            let answer = agent.ask(&prompt).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "content": answer }))?);
        }
        Command::Ingest { folder } => {
            let folder = folder.unwrap_or_else(|| app_config.docs_dir.clone());
            let report = pipeline.ingest(&folder).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Query { q, k } => {
            if index.is_empty() {
                warn!("Vector index is empty; run `sibyl ingest` first");
            }
            let results = pipeline.retrieve(&q, k).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

fn agent_config(app_config: &AppConfig) -> AgentConfig {
    let mut config = AgentConfig::new(app_config.chat_model.clone());
    config.system_prompt = app_config.system_prompt.clone();
    config.reflection = app_config.reflection;
    config.max_iters = app_config.max_iters;
    config.options = GenerationOptions {
        num_ctx: app_config.num_ctx,
        temperature: app_config.temperature,
    };
    config
}

fn build_agent(
    app_config: &AppConfig,
    pipeline: Arc<RetrievalPipeline>,
    agent_config: AgentConfig,
) -> Agent<OllamaClient> {
    let provider = Arc::new(OllamaClient::new(app_config.ollama_url.clone()));
    let search = Arc::new(SearxClient::new(app_config.search_url.clone()));
    let toolbox = Toolbox::new(search, pipeline);
    Agent::new(provider, toolbox, agent_config)
}

async fn run_repl(
    agent: &mut Agent<OllamaClient>,
    model: &str,
) -> Result<(), Box<dyn Error>> {
    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = io::stdout();

    stdout
        .write_all(format!("Agent ready on {model}. Ctrl-D to exit.\n").as_bytes())
        .await?;

    loop {
        stdout.write_all(b"\nYou: ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            stdout.write_all(b"\nBye!\n").await?;
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match agent.ask(input).await {
            Ok(answer) => {
                stdout
                    .write_all(format!("\nAgent: {answer}\n").as_bytes())
                    .await?;
            }
            Err(err) => {
                // A failed turn should not end the session.
                stdout
                    .write_all(format!("\nAgent error: {}\n", err.user_message()).as_bytes())
                    .await?;
            }
        }
        stdout.flush().await?;
    }

    Ok(())
}

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
