
use async_trait::async_trait;
use std::cmp::Ordering;
use tokio::sync::RwLock;
use tracing::debug;

use super::{Document, SearchHit, VectorStore};
use crate::{GuideError, Result};

/// In-process vector index backed by exhaustive cosine search
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<(Document, Vec<f32>)>>,
}

impl MemoryStore {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    dot / (norm_a * norm_b + 1e-8)
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn insert(&self, documents: Vec<Document>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if documents.len() != vectors.len() {
            return Err(GuideError::Retrieval(format!(
                "Mismatch between document and vector counts: {} vs {}",
                documents.len(),
                vectors.len()
            )));
        }

        let mut entries = self.entries.write().await;
        entries.extend(documents.into_iter().zip(vectors));
        debug!("Memory index now holds {} documents", entries.len());

        Ok(())
    }

    async fn search_similar(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let entries = self.entries.read().await;

        let mut hits: Vec<SearchHit> = entries
            .iter()
            .map(|(document, vector)| SearchHit {
                id: document.id.clone(),
                text: document.text.clone(),
                score: cosine_similarity(query_vector, vector),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);

        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
