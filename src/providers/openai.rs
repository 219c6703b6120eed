/*!
 * OpenAI-compatible chat completions client.
 *
 * DeepSeek exposes the same wire format, so both services share this client;
 * only the endpoint, model and key differ.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Default completions URL when no endpoint is configured
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI-compatible client
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// Base endpoint URL, or the full `.../chat/completions` URL
    endpoint: String,
    /// Model used by `prompt_request`
    model: String,
    /// Generation settings used by `prompt_request`
    temperature: f32,
    max_tokens: u32,
    /// Request timeout in seconds
    timeout_secs: u64,
}

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,

    /// Structured output mode
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,

    /// Always false, the client reads the whole answer at once
    stream: bool,
}

/// `response_format` payload
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

/// Chat message
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize, Default)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Chat completions response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices, the first one is used
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// One generated choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            temperature: Some(0.3),
            max_tokens: None,
            response_format: None,
            stream: false,
        }
    }
}

impl OpenAIRequest {
    /// Create a new request for the given model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum number of tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a JSON object answer
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }

    /// Messages added so far
    pub fn messages(&self) -> &[OpenAIMessage] {
        &self.messages
    }

    /// Whether JSON mode is requested
    pub fn is_json_mode(&self) -> bool {
        self.response_format.is_some()
    }
}

impl OpenAI {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            temperature: 0.3,
            max_tokens: 8192,
            timeout_secs,
        }
    }

    /// Set generation settings used by `prompt_request`
    pub fn with_generation(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Model used for requests built by this client
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full chat completions URL for the configured endpoint
    pub fn completions_url(&self) -> String {
        let base = if self.endpoint.is_empty() {
            DEFAULT_OPENAI_ENDPOINT
        } else {
            self.endpoint.trim_end_matches('/')
        };

        if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let api_url = self.completions_url();
        debug!("POST {} ({} messages)", api_url, request.messages.len());

        let response = self
            .client
            .post(&api_url)
            .header("Content-Type", "application/json")
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI-compatible API error ({}): {}", status, error_text);
            return Err(ProviderError::from_status(status.as_u16(), error_text));
        }

        response
            .json::<OpenAIResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = OpenAIRequest::new(&self.model)
            .add_message("user", "Hello")
            .max_tokens(5);

        self.complete(request).await?;
        Ok(())
    }

    fn prompt_request(&self, system: &str, prompt: &str, json_mode: bool) -> Self::Request {
        let request = OpenAIRequest::new(&self.model)
            .add_message("system", system)
            .add_message("user", prompt)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);

        if json_mode { request.json_object() } else { request }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}
