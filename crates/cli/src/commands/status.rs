//! `quill status` — Show configuration and model daemon health.

use quill_config::AppConfig;
use quill_providers::OllamaClient;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Quill Status");
    println!("============");
    println!("  Config dir:  {}", AppConfig::config_dir().display());
    println!("  Assistant:   {}", config.assistant_name);
    println!("  Model:       {}", config.model.model);
    println!("  Daemon:      {}", config.model.base_url);
    println!(
        "  Scoring:     threshold {}, cap {}, window {}h",
        config.scoring.relevance_threshold, config.scoring.max_memories, config.scoring.window_hours
    );
    println!("  History cap: {}", config.context.max_history);

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file — run `quill onboard` first");
    }

    let client = OllamaClient::new(&config.model.model, Some(&config.model.base_url))
        .map_err(|e| format!("Failed to build model client: {e}"))?;
    match client.health_check().await {
        Ok(true) => {
            println!("  Ollama daemon is reachable");
            match client.list_models().await {
                Ok(models) if !models.is_empty() => {
                    println!("  Models: {}", models.join(", "));
                }
                Ok(_) => println!("  No models pulled yet"),
                Err(err) => println!("  Could not list models: {err}"),
            }
        }
        Ok(false) => println!("  Ollama daemon answered with an error status"),
        Err(err) => println!("  Ollama daemon unreachable: {err}"),
    }

    Ok(())
}
