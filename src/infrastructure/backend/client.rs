/// HTTP adapter for the generation backend port
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use super::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::domain::models::config::BackendConfig;
use crate::domain::ports::{BackendError, CompletionRequest, GenerationBackend};

/// HTTP client for an Azure-style chat completions endpoint.
///
/// Addresses a deployment under the service base URL and authenticates
/// with an `api-key` header. Connection pooling comes with the shared
/// reqwest client; retry discipline stays with the caller.
pub struct HttpGenerationBackend {
    http_client: ReqwestClient,
    config: BackendConfig,
}

impl HttpGenerationBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    fn build_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.history.len() * 2 + 2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage::system(system));
        }
        for exchange in &request.history {
            messages.push(ChatMessage::user(&exchange.prompt));
            messages.push(ChatMessage::assistant(&exchange.response));
        }
        messages.push(ChatMessage::user(&request.prompt));
        messages
    }
}

#[async_trait]
impl GenerationBackend for HttpGenerationBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: request.model.clone(),
            messages: Self::build_messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            messages = body.messages.len(),
            max_tokens = body.max_tokens,
            "posting chat completion request"
        );

        let response = self
            .http_client
            .post(self.endpoint_url())
            .header("api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(BackendError::from_status(status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| BackendError::MalformedResponse(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| BackendError::MalformedResponse("response carried no choices".to_string()))
    }
}
