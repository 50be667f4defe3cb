#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::session::{ChatMessage, Role};
use crate::config::{Config, resolve_api_key};
use crate::describe_transport_error;
use crate::{GuideError, Result};

// Completion calls carry the whole conversation and can be slow
const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
const COMPLETION_TEMPERATURE: f32 = 0.7;

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    base_url: Url,
    model: String,
    api_key: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl CompletionClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .completion_url()
            .map_err(|e| GuideError::Config(format!("Invalid completion endpoint: {e}")))?;

        let api_key = resolve_api_key(&config.completion.api_key_env)
            .map_err(|e| GuideError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.completion.model.clone(),
            api_key,
            agent,
        })
    }

    /// Check that the endpoint is reachable with the configured credentials
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/v1/models")
            .map_err(|e| GuideError::Completion(format!("Failed to build models URL: {e}")))?;

        debug!("Checking completion endpoint at {}", url);

        self.authorize(self.agent.get(url.as_str()))
            .call()
            .map_err(|e| GuideError::Completion(describe_transport_error(&e)))?;

        Ok(())
    }

    /// Request a completion for the conversation; returns the top choice's
    /// text with surrounding whitespace stripped
    #[inline]
    pub fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|message| WireMessage {
                    role: message.role,
                    content: &message.content,
                })
                .collect(),
            temperature: COMPLETION_TEMPERATURE,
        };

        let url = self
            .base_url
            .join("/v1/chat/completions")
            .map_err(|e| GuideError::Completion(format!("Failed to build completions URL: {e}")))?;

        let request_json = serde_json::to_string(&request).map_err(|e| {
            GuideError::Completion(format!("Failed to serialize completion request: {e}"))
        })?;

        debug!("Requesting completion with {} messages", messages.len());

        let response_text = self
            .authorize(
                self.agent
                    .post(url.as_str())
                    .header("Content-Type", "application/json"),
            )
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| GuideError::Completion(describe_transport_error(&e)))?;

        let response: ChatCompletionResponse = serde_json::from_str(&response_text).map_err(
            |e| GuideError::Completion(format!("Failed to parse completion response: {e}")),
        )?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            GuideError::Completion("Completion response contained no choices".to_string())
        })?;

        Ok(choice.message.content.trim().to_string())
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}
