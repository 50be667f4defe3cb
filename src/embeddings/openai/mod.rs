#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::{Config, resolve_api_key};
use crate::describe_transport_error;
use crate::{GuideError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    base_url: Url,
    model: String,
    batch_size: u32,
    api_key: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .embedding_url()
            .map_err(|e| GuideError::Config(format!("Invalid embedding endpoint: {e}")))?;

        let api_key = resolve_api_key(&config.embedding.api_key_env)
            .map_err(|e| GuideError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.embedding.model.clone(),
            batch_size: config.embedding.batch_size,
            api_key,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Check that the endpoint is reachable with the configured credentials
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/v1/models")
            .map_err(|e| GuideError::Embedding(format!("Failed to build models URL: {e}")))?;

        debug!("Checking embedding endpoint at {}", url);

        self.authorize(self.agent.get(url.as_str()))
            .call()
            .map_err(|e| GuideError::Embedding(describe_transport_error(&e)))?;

        Ok(())
    }

    /// Embed a single text, typically a chat question
    #[inline]
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = vec![text.to_string()];
        let mut vectors = self.request_embeddings(&input)?;

        vectors.pop().ok_or_else(|| {
            GuideError::Embedding("Embedding response contained no vectors".to_string())
        })
    }

    /// Embed many texts, splitting requests to respect the configured batch size
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size as usize) {
            vectors.extend(self.request_embeddings(chunk)?);
        }

        Ok(vectors)
    }

    fn request_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        let url = self
            .base_url
            .join("/v1/embeddings")
            .map_err(|e| GuideError::Embedding(format!("Failed to build embeddings URL: {e}")))?;

        let request_json = serde_json::to_string(&request).map_err(|e| {
            GuideError::Embedding(format!("Failed to serialize embedding request: {e}"))
        })?;

        let response_text = self
            .authorize(
                self.agent
                    .post(url.as_str())
                    .header("Content-Type", "application/json"),
            )
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| GuideError::Embedding(describe_transport_error(&e)))?;

        let response: EmbeddingResponse = serde_json::from_str(&response_text).map_err(|e| {
            GuideError::Embedding(format!("Failed to parse embedding response: {e}"))
        })?;

        if response.data.len() != texts.len() {
            return Err(GuideError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|entry| entry.index);

        Ok(data.into_iter().map(|entry| entry.embedding).collect())
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}
