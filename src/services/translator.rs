/*!
 * Translation gateway backed by an LLM provider.
 */

use async_trait::async_trait;
use log::{debug, info};

use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::source::TranslationMap;

use super::cache::TranslationCache;
use super::prompts::{self, PromptTemplate};
use super::response::parse_translation_map;

/// Batch translation of literal candidates
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    /// Translate every value of `texts`.
    ///
    /// The answer may lack keys; callers treat missing keys as untranslated.
    async fn translate(&self, texts: &TranslationMap) -> Result<TranslationMap, TranslationError>;
}

/// `TranslationGateway` over any `Provider`
#[derive(Debug)]
pub struct LlmTranslator<P: Provider> {
    provider: P,
    source_language: String,
    target_language: String,
    /// Language names used in the prompt
    source_name: String,
    target_name: String,
    cache: TranslationCache,
}

impl<P: Provider> LlmTranslator<P> {
    /// Create a translator for a language pair
    ///
    /// Names are the human readable forms used in the prompt (e.g. "English").
    pub fn new(
        provider: P,
        source_language: (&str, &str),
        target_language: (&str, &str),
        cache: TranslationCache,
    ) -> Self {
        Self {
            provider,
            source_language: source_language.0.to_string(),
            source_name: source_language.1.to_string(),
            target_language: target_language.0.to_string(),
            target_name: target_language.1.to_string(),
            cache,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn request(&self, texts: &TranslationMap) -> Result<TranslationMap, TranslationError> {
        let system = PromptTemplate::label_translator().render(&self.source_name, &self.target_name);
        let prompt = prompts::translation_prompt(texts)
            .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;

        let request = self.provider.prompt_request(&system, &prompt, true);
        let response = self.provider.complete(request).await?;
        let answer = P::extract_text(&response);

        parse_translation_map(&answer, texts)
    }
}

#[async_trait]
impl<P: Provider> TranslationGateway for LlmTranslator<P> {
    async fn translate(&self, texts: &TranslationMap) -> Result<TranslationMap, TranslationError> {
        let mut translated = TranslationMap::new();
        let mut misses = TranslationMap::new();

        for (original, value) in texts {
            if original.trim().is_empty() {
                continue;
            }
            match self.cache.get(original, &self.source_language, &self.target_language) {
                Some(hit) => {
                    translated.insert(original.clone(), hit);
                }
                None => {
                    misses.insert(original.clone(), value.clone());
                }
            }
        }

        if misses.is_empty() {
            debug!("All {} texts served from cache", translated.len());
            return Ok(translated);
        }

        info!(
            "Translating {} texts ({} cached) from {} to {}",
            misses.len(),
            translated.len(),
            self.source_language,
            self.target_language
        );

        let fresh = self.request(&misses).await?;
        for (original, text) in &fresh {
            self.cache.store(original, &self.source_language, &self.target_language, text);
        }

        translated.extend(fresh);
        Ok(translated)
    }
}
