
// Index bootstrap module
// Embeds corpus passages and populates the vector index

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tracing::{debug, info};

use crate::Result;
use crate::embeddings::EmbeddingClient;
use crate::store::{Document, VectorStore};

/// Populates the vector index from corpus passages
pub struct Indexer {
    embedder: Arc<EmbeddingClient>,
    store: Arc<dyn VectorStore>,
}

impl Indexer {
    #[inline]
    pub fn new(embedder: Arc<EmbeddingClient>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed and insert the passages unless the index is already populated.
    ///
    /// Returns the number of documents the index holds afterwards.
    #[inline]
    pub async fn ensure_indexed(&self, texts: &[String]) -> Result<usize> {
        let existing = self.store.count().await?;
        if existing > 0 {
            info!(
                "Index already holds {} documents, skipping bootstrap",
                existing
            );
            return Ok(existing);
        }

        self.index(texts).await
    }

    /// Clear the index and rebuild it from the passages
    #[inline]
    pub async fn reindex(&self, texts: &[String]) -> Result<usize> {
        self.store.clear().await?;
        self.index(texts).await
    }

    async fn index(&self, texts: &[String]) -> Result<usize> {
        let bar = if console::user_attended_stderr() {
            ProgressBar::new_spinner().with_style(
                ProgressStyle::with_template("{spinner} [{pos}/{len}] Embedding guide passages")
                    .expect("style template is valid"),
            )
        } else {
            ProgressBar::hidden()
        };
        bar.set_position(0);
        bar.set_length(texts.len() as u64);

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.embedder.batch_size() as usize) {
            vectors.extend(self.embedder.embed_batch(chunk)?);
            bar.inc(chunk.len() as u64);
        }
        bar.finish_and_clear();

        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                id: format!("id{i}"),
                text: text.clone(),
            })
            .collect();

        debug!("Inserting {} documents into the index", documents.len());
        self.store.insert(documents, vectors).await?;

        info!("Indexed {} guide passages", texts.len());
        Ok(texts.len())
    }
}
