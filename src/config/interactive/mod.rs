
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{
    ChatConfig, CompletionConfig, Config, EmbeddingConfig, IndexBackend, IndexConfig,
    RetrievalConfig,
};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!(
        "{}",
        style("🔧 Guide Chat Configuration Setup").bold().cyan()
    );
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Embedding Configuration").bold().yellow());
    eprintln!("Configure the OpenAI-compatible endpoint used to embed questions and guide text.");
    eprintln!();

    configure_embedding(&mut config.embedding)?;

    eprintln!();
    eprintln!("{}", style("Completion Configuration").bold().yellow());
    configure_completion(&mut config.completion)?;

    eprintln!();
    eprintln!("{}", style("Index Configuration").bold().yellow());
    configure_index(&mut config.index)?;

    eprintln!();
    eprintln!("{}", style("Retrieval Configuration").bold().yellow());
    configure_retrieval(&mut config.retrieval)?;

    eprintln!();
    eprintln!("{}", style("Chat Configuration").bold().yellow());
    configure_chat(&mut config.chat)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_embedding_endpoint(&config)? {
        eprintln!("{}", style("✓ Embedding endpoint reachable!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not reach the embedding endpoint").yellow()
        );
        eprintln!("You can continue, but make sure the endpoint is reachable before indexing.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());

        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding Settings:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.embedding.base_url).cyan());
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!(
        "  Batch Size: {}",
        style(config.embedding.batch_size).cyan()
    );
    eprintln!(
        "  API Key Env: {}",
        style(display_key_env(&config.embedding.api_key_env)).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Completion Settings:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.completion.base_url).cyan());
    eprintln!("  Model: {}", style(&config.completion.model).cyan());
    eprintln!(
        "  API Key Env: {}",
        style(display_key_env(&config.completion.api_key_env)).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Index Settings:").bold().yellow());
    eprintln!("  Backend: {}", style(config.index.backend).cyan());
    if config.index.backend == IndexBackend::Qdrant {
        eprintln!("  URL: {}", style(&config.index.url).cyan());
        eprintln!("  Collection: {}", style(&config.index.collection).cyan());
        eprintln!(
            "  API Key Env: {}",
            style(display_key_env(&config.index.api_key_env)).cyan()
        );
    }

    eprintln!();
    eprintln!("{}", style("Retrieval Settings:").bold().yellow());
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!(
        "  Context Word Budget: {}",
        style(config.retrieval.max_context_words).cyan()
    );
    eprintln!(
        "  Score Threshold: {}",
        style(config.retrieval.score_threshold).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Chat Settings:").bold().yellow());
    eprintln!(
        "  History Cap: {} turns",
        style(config.chat.max_history_turns).cyan()
    );
    if config.chat.corpus.is_empty() {
        eprintln!("  Corpus: {}", style("not set").dim());
    } else {
        eprintln!("  Corpus: {}", style(&config.chat.corpus).cyan());
    }

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn display_key_env(var_name: &str) -> &str {
    if var_name.is_empty() { "none" } else { var_name }
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_embedding(embedding: &mut EmbeddingConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Embedding endpoint URL")
        .default(embedding.base_url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            match url::Url::parse(input) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
                _ => Err("URL must start with http:// or https://"),
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Embedding model")
        .default(embedding.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let batch_size: u32 = Input::new()
        .with_prompt("Batch size for embedding generation")
        .default(embedding.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Batch size must be greater than 0")
            } else if *input > 1000 {
                Err("Batch size must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("API key environment variable (empty for none)")
        .default(embedding.api_key_env.clone())
        .allow_empty(true)
        .interact_text()?;

    embedding.base_url = base_url;
    embedding.model = model;
    embedding.batch_size = batch_size;
    embedding.api_key_env = api_key_env.trim().to_string();
    embedding.validate()?;

    Ok(())
}

fn configure_completion(completion: &mut CompletionConfig) -> Result<()> {
    let base_url: String = Input::new()
        .with_prompt("Completion endpoint URL")
        .default(completion.base_url.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            match url::Url::parse(input) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
                _ => Err("URL must start with http:// or https://"),
            }
        })
        .interact_text()?;

    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(completion.model.clone())
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Model name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("API key environment variable (empty for none)")
        .default(completion.api_key_env.clone())
        .allow_empty(true)
        .interact_text()?;

    completion.base_url = base_url;
    completion.model = model;
    completion.api_key_env = api_key_env.trim().to_string();
    completion.validate()?;

    Ok(())
}

fn configure_index(index: &mut IndexConfig) -> Result<()> {
    let backends = &["memory", "qdrant"];
    let default_index = match index.backend {
        IndexBackend::Memory => 0,
        IndexBackend::Qdrant => 1,
    };

    let backend_index = Select::new()
        .with_prompt("Index backend")
        .default(default_index)
        .items(backends)
        .interact()?;

    index.backend = if backend_index == 1 {
        IndexBackend::Qdrant
    } else {
        IndexBackend::Memory
    };

    if index.backend == IndexBackend::Qdrant {
        let url: String = Input::new()
            .with_prompt("Qdrant URL")
            .default(index.url.clone())
            .validate_with(|input: &String| -> Result<(), &str> {
                match url::Url::parse(input) {
                    Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
                    _ => Err("URL must start with http:// or https://"),
                }
            })
            .interact_text()?;

        let collection: String = Input::new()
            .with_prompt("Collection name")
            .default(index.collection.clone())
            .validate_with(|input: &String| -> Result<(), &str> {
                if input.trim().is_empty() {
                    Err("Collection name cannot be empty")
                } else {
                    Ok(())
                }
            })
            .interact_text()?;

        let api_key_env: String = Input::new()
            .with_prompt("Qdrant API key environment variable (empty for none)")
            .default(index.api_key_env.clone())
            .allow_empty(true)
            .interact_text()?;

        index.url = url;
        index.collection = collection;
        index.api_key_env = api_key_env.trim().to_string();
    }

    index.validate()?;

    Ok(())
}

fn configure_retrieval(retrieval: &mut RetrievalConfig) -> Result<()> {
    let top_k: usize = Input::new()
        .with_prompt("Passages to retrieve per question")
        .default(retrieval.top_k)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("top_k must be greater than 0")
            } else if *input > 100 {
                Err("top_k must be 100 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let max_context_words: usize = Input::new()
        .with_prompt("Context word budget")
        .default(retrieval.max_context_words)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("Word budget must be greater than 0")
            } else if *input > 100_000 {
                Err("Word budget must be 100000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let score_threshold: f32 = Input::new()
        .with_prompt("Minimum similarity score (0 to disable)")
        .default(retrieval.score_threshold)
        .validate_with(|input: &f32| -> Result<(), &str> {
            if (0.0..=1.0).contains(input) {
                Ok(())
            } else {
                Err("Score threshold must be between 0.0 and 1.0")
            }
        })
        .interact_text()?;

    retrieval.top_k = top_k;
    retrieval.max_context_words = max_context_words;
    retrieval.score_threshold = score_threshold;
    retrieval.validate()?;

    Ok(())
}

fn configure_chat(chat: &mut ChatConfig) -> Result<()> {
    let max_history_turns: usize = Input::new()
        .with_prompt("Chat history cap in turns")
        .default(chat.max_history_turns)
        .validate_with(|input: &usize| -> Result<(), &str> {
            if *input == 0 {
                Err("History cap must be greater than 0")
            } else if *input > 1000 {
                Err("History cap must be 1000 or less")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    let corpus: String = Input::new()
        .with_prompt("Guide corpus CSV path (empty to skip startup bootstrap)")
        .default(chat.corpus.clone())
        .allow_empty(true)
        .interact_text()?;

    chat.max_history_turns = max_history_turns;
    chat.corpus = corpus.trim().to_string();
    chat.validate()?;

    Ok(())
}

fn test_embedding_endpoint(config: &Config) -> Result<bool> {
    let Ok(base) = config.embedding_url() else {
        return Ok(false);
    };
    let Ok(url) = base.join("/v1/models") else {
        return Ok(false);
    };

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(5)))
        .build()
        .into();

    match agent.get(url.as_str()).call() {
        Ok(_) => Ok(true),
        Err(ureq::Error::StatusCode(code)) if (400..500).contains(&code) => Ok(true),
        Err(_) => Ok(false),
    }
}
