
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{Document, SearchHit, VectorStore};
use crate::config::{Config, resolve_api_key};
use crate::describe_transport_error;
use crate::{GuideError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Vector index backed by a Qdrant collection over its REST API
#[derive(Debug, Clone)]
pub struct QdrantStore {
    base_url: Url,
    collection: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct CreateCollectionRequest {
    vectors: VectorParams,
}

#[derive(Debug, Serialize)]
struct VectorParams {
    size: usize,
    distance: &'static str,
}

#[derive(Debug, Serialize)]
struct UpsertPointsRequest {
    points: Vec<PointStruct>,
}

#[derive(Debug, Serialize)]
struct PointStruct {
    id: u64,
    vector: Vec<f32>,
    payload: PointPayload,
}

#[derive(Debug, Serialize, Deserialize)]
struct PointPayload {
    doc_id: String,
    text: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    payload: Option<PointPayload>,
}

#[derive(Debug, Serialize)]
struct CountRequest {
    exact: bool,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    result: CountResult,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: usize,
}

impl QdrantStore {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .index_url()
            .map_err(|e| GuideError::Config(format!("Invalid index endpoint: {e}")))?;

        let api_key = resolve_api_key(&config.index.api_key_env)
            .map_err(|e| GuideError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            collection: config.index.collection.clone(),
            api_key,
            agent,
        })
    }

    /// Create the collection if it does not exist yet
    fn ensure_collection(&self, vector_size: usize) -> Result<()> {
        let url = self.collection_url(None)?;

        let exists = match self.authorize(self.agent.get(url.as_str())).call() {
            Ok(_) => true,
            Err(ureq::Error::StatusCode(404)) => false,
            Err(e) => return Err(GuideError::Retrieval(describe_transport_error(&e))),
        };

        if exists {
            debug!("Collection {} already exists", self.collection);
            return Ok(());
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, vector_size
        );

        let request = CreateCollectionRequest {
            vectors: VectorParams {
                size: vector_size,
                distance: "Cosine",
            },
        };
        let body = serde_json::to_string(&request).map_err(|e| {
            GuideError::Retrieval(format!("Failed to serialize create request: {e}"))
        })?;

        self.authorize(
            self.agent
                .put(url.as_str())
                .header("Content-Type", "application/json"),
        )
        .send(&body)
        .map_err(|e| GuideError::Retrieval(describe_transport_error(&e)))?;

        Ok(())
    }

    fn point_count(&self) -> Result<usize> {
        let url = self.collection_url(Some("points/count"))?;
        let body = serde_json::to_string(&CountRequest { exact: true })
            .map_err(|e| GuideError::Retrieval(format!("Failed to serialize count request: {e}")))?;

        let response_text = match self
            .authorize(
                self.agent
                    .post(url.as_str())
                    .header("Content-Type", "application/json"),
            )
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
        {
            Ok(text) => text,
            // A missing collection is simply an empty index
            Err(ureq::Error::StatusCode(404)) => return Ok(0),
            Err(e) => return Err(GuideError::Retrieval(describe_transport_error(&e))),
        };

        let response: CountResponse = serde_json::from_str(&response_text)
            .map_err(|e| GuideError::Retrieval(format!("Failed to parse count response: {e}")))?;

        Ok(response.result.count)
    }

    fn collection_url(&self, suffix: Option<&str>) -> Result<Url> {
        let path = match suffix {
            Some(suffix) => format!("/collections/{}/{}", self.collection, suffix),
            None => format!("/collections/{}", self.collection),
        };

        self.base_url
            .join(&path)
            .map_err(|e| GuideError::Retrieval(format!("Failed to build collection URL: {e}")))
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.api_key {
            Some(key) => request.header("api-key", key.as_str()),
            None => request,
        }
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn count(&self) -> Result<usize> {
        self.point_count()
    }

    async fn insert(&self, documents: Vec<Document>, vectors: Vec<Vec<f32>>) -> Result<()> {
        if documents.len() != vectors.len() {
            return Err(GuideError::Retrieval(format!(
                "Mismatch between document and vector counts: {} vs {}",
                documents.len(),
                vectors.len()
            )));
        }

        let Some(first) = vectors.first() else {
            return Ok(());
        };
        self.ensure_collection(first.len())?;

        let start = self.point_count()? as u64;

        let points: Vec<PointStruct> = documents
            .into_iter()
            .zip(vectors)
            .enumerate()
            .map(|(offset, (document, vector))| PointStruct {
                id: start + offset as u64,
                vector,
                payload: PointPayload {
                    doc_id: document.id,
                    text: document.text,
                },
            })
            .collect();

        let point_count = points.len();
        let request = UpsertPointsRequest { points };
        let url = self.collection_url(Some("points?wait=true"))?;
        let body = serde_json::to_string(&request).map_err(|e| {
            GuideError::Retrieval(format!("Failed to serialize upsert request: {e}"))
        })?;

        self.authorize(
            self.agent
                .put(url.as_str())
                .header("Content-Type", "application/json"),
        )
        .send(&body)
        .map_err(|e| GuideError::Retrieval(describe_transport_error(&e)))?;

        debug!(
            "Upserted {} points into collection {}",
            point_count, self.collection
        );

        Ok(())
    }

    async fn search_similar(&self, query_vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            vector: query_vector,
            limit,
            with_payload: true,
        };

        let url = self.collection_url(Some("points/search"))?;
        let body = serde_json::to_string(&request).map_err(|e| {
            GuideError::Retrieval(format!("Failed to serialize search request: {e}"))
        })?;

        let response_text = self
            .authorize(
                self.agent
                    .post(url.as_str())
                    .header("Content-Type", "application/json"),
            )
            .send(&body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| GuideError::Retrieval(describe_transport_error(&e)))?;

        let response: SearchResponse = serde_json::from_str(&response_text)
            .map_err(|e| GuideError::Retrieval(format!("Failed to parse search response: {e}")))?;

        let hits = response
            .result
            .into_iter()
            .filter_map(|point| {
                point.payload.map(|payload| SearchHit {
                    id: payload.doc_id,
                    text: payload.text,
                    score: point.score,
                })
            })
            .collect();

        Ok(hits)
    }

    async fn clear(&self) -> Result<()> {
        let url = self.collection_url(None)?;

        match self.authorize(self.agent.delete(url.as_str())).call() {
            Ok(_) => {
                info!("Deleted collection {}", self.collection);
                Ok(())
            }
            Err(ureq::Error::StatusCode(404)) => Ok(()),
            Err(e) => Err(GuideError::Retrieval(describe_transport_error(&e))),
        }
    }
}
