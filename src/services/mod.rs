/*!
 * External generation services.
 *
 * The pipeline only sees the `TranslationGateway` and `HolisticRewriter`
 * traits; this module provides LLM-backed implementations and builds them
 * from the application configuration.
 */

use anyhow::Result;
use log::debug;
use std::sync::Arc;

use crate::app_config::{Config, ServiceProvider};
use crate::language_utils;
use crate::providers::anthropic::Anthropic;
use crate::providers::Provider;
use crate::providers::openai::OpenAI;

pub mod cache;
pub mod prompts;
pub mod response;
pub mod rewriter;
pub mod translator;

pub use cache::{CacheStats, TranslationCache};
pub use rewriter::{HolisticRewriter, LlmRewriter, validate_rewrite};
pub use translator::{LlmTranslator, TranslationGateway};

/// Both collaborators, built for the configured provider
#[derive(Clone)]
pub struct ServiceSet {
    pub translator: Arc<dyn TranslationGateway>,
    pub rewriter: Arc<dyn HolisticRewriter>,
}

impl ServiceSet {
    /// Build LLM-backed services for the active provider
    pub fn from_config(config: &Config, cache: TranslationCache) -> Result<Self> {
        let service = &config.service;
        let (model, api_key, endpoint, timeout) = (
            service.get_model(),
            service.get_api_key(),
            service.get_endpoint(),
            service.get_timeout_secs(),
        );
        let (temperature, max_tokens) = (service.common.temperature, service.common.max_tokens);

        // Cache keys use the canonical code so `zh` and `chi` share entries
        let source = (
            language_utils::normalize_to_part1_or_part2t(&config.source_language)?,
            language_utils::get_language_name(&config.source_language)?,
        );
        let target = (
            language_utils::normalize_to_part1_or_part2t(&config.target_language)?,
            language_utils::get_language_name(&config.target_language)?,
        );

        debug!("Building {} services with model {}", service.provider.display_name(), model);

        let set = match service.provider {
            ServiceProvider::DeepSeek | ServiceProvider::OpenAI => {
                let client = || {
                    OpenAI::new(&api_key, &endpoint, &model, timeout).with_generation(temperature, max_tokens)
                };
                Self {
                    translator: Arc::new(LlmTranslator::new(
                        client(),
                        (source.0.as_str(), source.1.as_str()),
                        (target.0.as_str(), target.1.as_str()),
                        cache,
                    )),
                    rewriter: Arc::new(LlmRewriter::new(client())),
                }
            }
            ServiceProvider::Anthropic => {
                let client = || {
                    Anthropic::new(&api_key, &endpoint, &model, timeout).with_generation(temperature, max_tokens)
                };
                Self {
                    translator: Arc::new(LlmTranslator::new(
                        client(),
                        (source.0.as_str(), source.1.as_str()),
                        (target.0.as_str(), target.1.as_str()),
                        cache,
                    )),
                    rewriter: Arc::new(LlmRewriter::new(client())),
                }
            }
        };

        Ok(set)
    }
}

/// Send a minimal request to the configured provider
pub async fn test_connection(config: &Config) -> Result<()> {
    let service = &config.service;
    let (model, api_key, endpoint, timeout) = (
        service.get_model(),
        service.get_api_key(),
        service.get_endpoint(),
        service.get_timeout_secs(),
    );

    match service.provider {
        ServiceProvider::DeepSeek | ServiceProvider::OpenAI => {
            OpenAI::new(api_key, endpoint, model, timeout).test_connection().await?
        }
        ServiceProvider::Anthropic => {
            Anthropic::new(api_key, endpoint, model, timeout).test_connection().await?
        }
    }

    Ok(())
}
