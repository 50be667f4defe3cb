
use std::sync::Arc;
use tracing::debug;

use crate::Result;
use crate::config::RetrievalConfig;
use crate::embeddings::EmbeddingClient;
use crate::store::{SearchHit, VectorStore};

/// Separator placed between passages in an assembled context
pub const CONTEXT_SEPARATOR: &str = "\n\n###\n\n";

/// Number of whitespace-separated words in a text
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Concatenate hits in order until adding another passage would push the
/// total word count past `max_words`. The walk stops at the first passage
/// that does not fit; passages are never truncated or skipped over.
#[inline]
pub fn fit_to_budget(hits: &[SearchHit], max_words: usize) -> String {
    if max_words == 0 {
        return String::new();
    }

    let mut included = Vec::new();
    let mut total = 0;

    for hit in hits {
        let words = word_count(&hit.text);
        if total + words > max_words {
            break;
        }

        included.push(hit.text.as_str());
        total += words;
    }

    included.join(CONTEXT_SEPARATOR)
}

/// Builds the retrieval context for a question: embed, search, filter, budget
pub struct ContextAssembler {
    embedder: Arc<EmbeddingClient>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
    max_words: usize,
    score_threshold: Option<f32>,
}

impl ContextAssembler {
    #[inline]
    pub fn new(
        embedder: Arc<EmbeddingClient>,
        store: Arc<dyn VectorStore>,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k: retrieval.top_k,
            max_words: retrieval.max_context_words,
            score_threshold: retrieval.threshold(),
        }
    }

    /// Assemble the context string for a question
    #[inline]
    pub async fn build_context(&self, question: &str) -> Result<String> {
        let query_vector = self.embedder.embed(question)?;
        let mut hits = self.store.search_similar(&query_vector, self.top_k).await?;

        // Threshold filtering is a pre-pass over the full candidate list,
        // applied before the budget walk
        if let Some(threshold) = self.score_threshold {
            hits.retain(|hit| hit.score >= threshold);
        }

        debug!("Assembling context from {} candidate passages", hits.len());

        Ok(fit_to_budget(&hits, self.max_words))
    }
}
