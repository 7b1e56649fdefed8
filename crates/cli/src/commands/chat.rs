//! `quill ask` / `quill chat` — single-message and interactive modes.

use quill_analysis::KeywordAnalyzer;
use quill_config::AppConfig;
use quill_core::error::Error;
use quill_core::interaction::InteractionSource;
use quill_engine::{Assistant, ScorerConfig};
use quill_memory::InMemoryStore;
use quill_providers::OllamaClient;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Build the assistant from configuration.
fn build_assistant(config: &AppConfig) -> Result<Assistant, Box<dyn std::error::Error>> {
    let llm = OllamaClient::new(&config.model.model, Some(&config.model.base_url))
        .map_err(|e| format!("Failed to build model client: {e}"))?;

    let scorer = ScorerConfig {
        keyword_weight: config.scoring.keyword_weight,
        recency_weight: config.scoring.recency_weight,
        importance_weight: config.scoring.importance_weight,
        context_weight: config.scoring.context_weight,
        relevance_threshold: config.scoring.relevance_threshold,
        max_memories: config.scoring.max_memories,
        window_hours: config.scoring.window_hours,
        ..ScorerConfig::default()
    };

    Ok(Assistant::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(KeywordAnalyzer::new()),
        Arc::new(llm),
    )
    .with_name(config.assistant_name.clone())
    .with_scorer_config(scorer)
    .with_context_capacity(config.context.max_history))
}

fn render_reply(result: Result<String, Error>, name: &str) {
    match result {
        Ok(reply) => {
            for line in reply.lines() {
                println!("  {name} > {line}");
            }
        }
        Err(Error::Llm(err)) => {
            tracing::error!(%err, "Model call failed");
            println!("  {name} > Sorry, I'm having trouble reaching the language model right now.");
        }
        Err(err) => {
            eprintln!("  [Error] {err}");
        }
    }
}

/// Single-message mode.
pub async fn run_once(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let name = config.assistant_name.clone();
    let assistant = build_assistant(&config)?;

    let result = assistant
        .handle_message(message, InteractionSource::Local)
        .await;
    render_reply(result, &name);

    Ok(())
}

/// Interactive conversation mode.
pub async fn run_interactive() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let name = config.assistant_name.clone();
    let assistant = build_assistant(&config)?;

    println!();
    println!("  Quill — Interactive Mode");
    println!();
    println!("  Model:  {}", config.model.model);
    println!("  Daemon: {}", config.model.base_url);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    use std::io::Write;
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") {
            break;
        }
        if !message.is_empty() {
            let result = assistant
                .handle_message(message, InteractionSource::Local)
                .await;
            println!();
            render_reply(result, &name);
            println!();
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
