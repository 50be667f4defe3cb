// Embeddings module
// Handles embedding generation through an OpenAI-compatible endpoint

pub mod openai;

pub use openai::EmbeddingClient;
