// Vector index module
// Stores embedded guide passages and serves similarity search

pub mod memory;
pub mod qdrant;

use async_trait::async_trait;

use crate::Result;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// A guide passage held in the index
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Single result of a similarity search, best matches first
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub text: String,
    pub score: f32,
}

/// Backend-independent interface to the vector index
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Number of documents currently stored
    async fn count(&self) -> Result<usize>;

    /// Insert documents with their embedding vectors, one vector per document
    async fn insert(&self, documents: Vec<Document>, vectors: Vec<Vec<f32>>) -> Result<()>;

    /// Return up to `limit` documents ranked by similarity to the query vector
    async fn search_similar(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>>;

    /// Remove every document from the index
    async fn clear(&self) -> Result<()>;
}
