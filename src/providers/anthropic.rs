/*!
 * Anthropic messages API client.
 */

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Messages URL used when no endpoint is configured
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";

const API_VERSION: &str = "2023-06-01";

/// Anthropic client
#[derive(Debug)]
pub struct Anthropic {
    client: Client,
    api_key: String,
    /// Base URL; `/v1/messages` is appended
    endpoint: String,
    // @field: generation settings for prompt_request
    model: String,
    max_tokens: u32,
    temperature: f32,
    timeout_secs: u64,
}

/// Messages request; the system prompt travels outside the turn list
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Turn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// One conversation turn
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

/// Content block of an answer; only text blocks carry script text
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Default)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Messages response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<ContentBlock>,
    /// `end_turn`, or `max_tokens` when the answer was cut off
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Usage,
}

impl AnthropicResponse {
    /// True when generation stopped at the token limit
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

impl AnthropicRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: None,
            messages: Vec::new(),
            temperature: None,
        }
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Turn {
            role: "user".to_string(),
            content: content.into(),
        });
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

impl Anthropic {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            max_tokens: 8192,
            temperature: 0.3,
            timeout_secs,
        }
    }

    /// Set generation settings used by `prompt_request`
    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Full messages URL for the configured endpoint
    pub fn messages_url(&self) -> String {
        let base = match self.endpoint.trim_end_matches('/') {
            "" => DEFAULT_ANTHROPIC_ENDPOINT,
            base => base,
        };
        format!("{}/v1/messages", base)
    }
}

#[async_trait]
impl Provider for Anthropic {
    type Request = AnthropicRequest;
    type Response = AnthropicResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Anthropic rejected the request ({}): {}", status, body);
            return Err(ProviderError::from_status(status.as_u16(), body));
        }

        let answer = response
            .json::<AnthropicResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        if answer.is_truncated() {
            warn!(
                "Anthropic answer hit the {} token limit after {} output tokens",
                request.max_tokens, answer.usage.output_tokens
            );
        }
        Ok(answer)
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        self.complete(AnthropicRequest::new(&self.model, 10).user("Hello"))
            .await
            .map(|_| ())
    }

    // No JSON mode here; the prompt itself asks for a bare object.
    fn prompt_request(&self, system: &str, prompt: &str, _json_mode: bool) -> Self::Request {
        AnthropicRequest::new(&self.model, self.max_tokens)
            .system(system)
            .user(prompt)
            .temperature(self.temperature)
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }
}
