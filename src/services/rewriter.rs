/*!
 * Holistic rewrite of a whole script by an LLM provider.
 *
 * The answer is never trusted as-is: `validate_rewrite` must accept it before
 * it replaces the working text.
 */

use async_trait::async_trait;
use log::info;

use crate::errors::RewriteError;
use crate::providers::Provider;
use crate::source::PlotRules;

use super::cache::truncate_text;
use super::prompts::{self, PromptTemplate};
use super::response::strip_code_fences;

/// Rewrites a document according to an ordered instruction list
#[async_trait]
pub trait HolisticRewriter: Send + Sync {
    async fn rewrite(&self, document: &str, instructions: &[String]) -> Result<String, RewriteError>;
}

/// `HolisticRewriter` over any `Provider`
#[derive(Debug)]
pub struct LlmRewriter<P: Provider> {
    provider: P,
}

impl<P: Provider> LlmRewriter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P: Provider> HolisticRewriter for LlmRewriter<P> {
    async fn rewrite(&self, document: &str, instructions: &[String]) -> Result<String, RewriteError> {
        if instructions.is_empty() {
            return Err(RewriteError::NotRequested);
        }

        info!("Requesting holistic rewrite with {} instructions", instructions.len());

        let system = PromptTemplate::FIGURE_REWRITER;
        let prompt = prompts::rewrite_prompt(document, instructions);
        let request = self.provider.prompt_request(system, &prompt, false);

        let response = self.provider.complete(request).await?;
        Ok(strip_code_fences(&P::extract_text(&response)).to_string())
    }
}

/// Accept a rewritten document only if it looks like code
pub fn validate_rewrite(answer: &str, rules: &PlotRules) -> Result<String, RewriteError> {
    let body = strip_code_fences(answer);

    if body.trim().is_empty() || !rules.looks_like_code(body) {
        return Err(RewriteError::Rejected {
            preview: truncate_text(body.trim(), 200),
        });
    }

    Ok(body.to_string())
}
