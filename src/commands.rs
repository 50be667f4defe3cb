use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::GuideError;
use crate::chat::{AnswerGenerator, ChatSession, CompletionClient};
use crate::config::{Config, IndexBackend};
use crate::context::ContextAssembler;
use crate::corpus::load_corpus;
use crate::embeddings::EmbeddingClient;
use crate::indexer::Indexer;
use crate::store::{MemoryStore, QdrantStore, VectorStore};

/// Build the vector index from a corpus file
#[inline]
pub async fn init_index(corpus: PathBuf, force: bool) -> Result<()> {
    info!("Building index from {}", corpus.display());

    let config = Config::load().context("Failed to load configuration")?;

    if config.index.backend == IndexBackend::Memory {
        println!("❌ The in-memory backend keeps no state between runs.");
        println!("   Set index.backend = \"qdrant\" in the config, or point chat.corpus");
        println!("   at the corpus file so chat sessions index it at startup.");
        return Err(
            GuideError::Config("'init' requires a persistent index backend".to_string()).into(),
        );
    }

    let passages = load_corpus(&corpus)
        .with_context(|| format!("Failed to load corpus from {}", corpus.display()))?;
    println!(
        "📖 Loaded {} passages from {}",
        passages.len(),
        corpus.display()
    );

    let embedder = Arc::new(EmbeddingClient::new(&config)?);
    let store = open_store(&config)?;

    // Refuse to clobber an existing index unless asked to
    if !force {
        let existing = store.count().await?;
        if existing > 0 {
            println!(
                "Index '{}' already holds {} passages.",
                config.index.collection, existing
            );
            println!("Use --force to rebuild it from the corpus.");
            return Ok(());
        }
    }

    let indexer = Indexer::new(Arc::clone(&embedder), Arc::clone(&store));
    let indexed = if force {
        println!("🔄 Rebuilding the index from scratch...");
        indexer.reindex(&passages).await?
    } else {
        indexer.ensure_indexed(&passages).await?
    };

    println!(
        "✅ Indexed {} passages into '{}'",
        indexed, config.index.collection
    );

    Ok(())
}

/// Answer a single question against the indexed guide
#[inline]
pub async fn ask(question: String, show_context: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let embedder = Arc::new(EmbeddingClient::new(&config)?);
    let store = open_store(&config)?;
    prepare_index(&config, &embedder, &store).await?;

    let generator = AnswerGenerator::new(
        ContextAssembler::new(Arc::clone(&embedder), Arc::clone(&store), &config.retrieval),
        CompletionClient::new(&config)?,
    );
    let mut session = ChatSession::new(config.chat.max_history_turns);

    let answer = generator.answer(&mut session, &question).await?;
    if show_context {
        print_context(&answer.context);
    }
    println!("{}", answer.text);

    Ok(())
}

/// Run an interactive chat session against the indexed guide
#[inline]
pub async fn chat(show_context: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    let embedder = Arc::new(EmbeddingClient::new(&config)?);
    let store = open_store(&config)?;
    let indexed = prepare_index(&config, &embedder, &store).await?;

    let generator = AnswerGenerator::new(
        ContextAssembler::new(Arc::clone(&embedder), Arc::clone(&store), &config.retrieval),
        CompletionClient::new(&config)?,
    );
    let mut session = ChatSession::new(config.chat.max_history_turns);

    info!("Starting chat session with {} indexed passages", indexed);

    println!("💬 Guide Chat ({} passages indexed)", indexed);
    println!("{}", "=".repeat(50));
    println!("Ask about the game. Type 'exit' or 'quit' to leave.");
    println!();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let bytes_read = io::stdin()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if bytes_read == 0 {
            println!();
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        let thinking = thinking_spinner();
        let result = generator.answer(&mut session, question).await;
        thinking.finish_and_clear();

        // A failed turn is reported and the session keeps going
        match result {
            Ok(answer) => {
                if show_context {
                    print_context(&answer.context);
                }
                println!("{}", answer.text);
                println!();
            }
            Err(e) => {
                error!("Chat turn failed: {}", e);
                println!("❌ Error: {}", e);
                println!();
            }
        }
    }

    println!("👋 Session ended");

    Ok(())
}

/// Show the health of every configured backend
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("📊 Guide Chat Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🧮 Embedding Endpoint:");
    match EmbeddingClient::new(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!("   ✅ Reachable at {}", config.embedding.base_url);
                println!("   📋 Model: {}", config.embedding.model);
                println!("   🔢 Batch Size: {}", config.embedding.batch_size);
            }
            Err(e) => {
                println!("   ⚠️  Not reachable - {}", e);
            }
        },
        Err(e) => {
            println!("   ❌ Failed to configure - {}", e);
        }
    }

    println!();
    println!("💬 Completion Endpoint:");
    match CompletionClient::new(&config) {
        Ok(client) => match client.health_check() {
            Ok(()) => {
                println!("   ✅ Reachable at {}", config.completion.base_url);
                println!("   📋 Model: {}", config.completion.model);
            }
            Err(e) => {
                println!("   ⚠️  Not reachable - {}", e);
            }
        },
        Err(e) => {
            println!("   ❌ Failed to configure - {}", e);
        }
    }

    println!();
    println!("🔍 Vector Index:");
    match config.index.backend {
        IndexBackend::Memory => {
            println!("   ✅ Backend: memory");
            println!("   💾 Passages are re-embedded from the corpus at startup");
        }
        IndexBackend::Qdrant => match QdrantStore::new(&config) {
            Ok(store) => match store.count().await {
                Ok(count) => {
                    println!("   ✅ Qdrant: Connected ({})", config.index.url);
                    println!("   🗄️  Collection: {}", config.index.collection);
                    println!("   📄 Indexed Passages: {}", count);
                }
                Err(e) => {
                    println!("   ❌ Qdrant: Failed to query - {}", e);
                }
            },
            Err(e) => {
                println!("   ❌ Qdrant: Failed to configure - {}", e);
            }
        },
    }

    println!();
    println!("📖 Corpus:");
    match config.chat.corpus_path() {
        Some(path) if path.exists() => {
            println!("   ✅ {}", path.display());
        }
        Some(path) => {
            println!("   ⚠️  Configured but missing: {}", path.display());
        }
        None => {
            println!("   📭 Not configured (chat sessions rely on a prebuilt index)");
        }
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'guide-chat config' to adjust endpoints and models");
    println!("   • Use 'guide-chat init <corpus>' to build a persistent index");
    println!("   • Use 'guide-chat chat' to start asking questions");

    Ok(())
}

/// Open the vector store named by the configuration
fn open_store(config: &Config) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match config.index.backend {
        IndexBackend::Memory => Arc::new(MemoryStore::new()),
        IndexBackend::Qdrant => Arc::new(QdrantStore::new(config)?),
    };
    Ok(store)
}

/// Make sure the index has documents before a question can be answered
async fn prepare_index(
    config: &Config,
    embedder: &Arc<EmbeddingClient>,
    store: &Arc<dyn VectorStore>,
) -> Result<usize> {
    match config.chat.corpus_path() {
        Some(path) => {
            let passages = load_corpus(path)
                .with_context(|| format!("Failed to load corpus from {}", path.display()))?;
            let indexer = Indexer::new(Arc::clone(embedder), Arc::clone(store));
            Ok(indexer.ensure_indexed(&passages).await?)
        }
        None => {
            let count = store.count().await?;
            if count == 0 {
                return Err(GuideError::Config(
                    "The index is empty and no corpus file is configured. \
                     Run 'guide-chat init <corpus>' or set chat.corpus in the config."
                        .to_string(),
                )
                .into());
            }
            Ok(count)
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    if console::user_attended_stderr() {
        let bar = ProgressBar::new_spinner().with_message("Thinking...");
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    } else {
        ProgressBar::hidden()
    }
}

fn print_context(context: &str) {
    if context.is_empty() {
        println!("📎 No context passages fit the word budget");
    } else {
        println!("📎 Context:");
        for line in context.lines() {
            println!("   {}", line);
        }
    }
    println!();
}
