use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use super::CompletionService;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const LOGGED_BODY_CHARS: usize = 500;

/// HTTP client for the external chat-completion endpoint.
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CompletionClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::new_with_client(api_key, base_url, client))
    }

    pub fn new_with_client(api_key: String, base_url: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Underlying connection pool, shared with result downloads.
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}{}", self.base_url, COMPLETIONS_PATH);
        tracing::debug!(
            "Sending chat completion request (model: {}, messages: {})",
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to completion endpoint: {}", e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Completion API error (status {}): {}", status, error_text);
            return Err(Error::Upstream(format!(
                "completion API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let prefix: String = body.chars().take(LOGGED_BODY_CHARS).collect();
            tracing::error!(
                "Failed to parse completion response ({} bytes): {}\nBody prefix: {}",
                body.len(),
                e,
                prefix
            );
            Error::MalformedResponse(format!("unexpected completion response shape: {}", e))
        })
    }
}

#[async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.chat_completion(request).await
    }
}
