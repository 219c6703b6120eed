/*!
 * Provider implementations for the generation services.
 *
 * This module contains client implementations for the supported LLM providers:
 * - OpenAI: OpenAI-compatible chat completions (OpenAI, DeepSeek)
 * - Anthropic: Anthropic messages API
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation and rewrite services.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    ///
    /// # Returns
    /// * `Result<(), ProviderError>` - Ok if the connection is successful, or an error
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Build a single-turn request
    ///
    /// # Arguments
    /// * `system` - System prompt
    /// * `prompt` - User message
    /// * `json_mode` - Ask the service for a JSON object answer when it supports it
    fn prompt_request(&self, system: &str, prompt: &str, json_mode: bool) -> Self::Request;

    /// Extract text from the provider response
    ///
    /// # Arguments
    /// * `response` - The response from the provider
    ///
    /// # Returns
    /// * `String` - The extracted text
    fn extract_text(response: &Self::Response) -> String;
}

pub mod anthropic;
pub mod mock;
pub mod openai;
