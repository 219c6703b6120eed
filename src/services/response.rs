/*!
 * Post-processing of raw service answers.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::errors::TranslationError;
use crate::source::TranslationMap;

use super::cache::truncate_text;

/// An answer wrapped entirely in one markdown code fence
static FENCED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("valid fence pattern")
});

/// Remove a markdown fence wrapping the whole answer, if there is one
pub fn strip_code_fences(answer: &str) -> &str {
    match FENCED.captures(answer).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => answer,
    }
}

/// Parse a translation answer, keeping every non-blank key with a non-blank string value.
///
/// Keys that were not requested are kept; the merge applies them longest first
/// together with the requested ones.
pub fn parse_translation_map(answer: &str, requested: &TranslationMap) -> Result<TranslationMap, TranslationError> {
    let body = strip_code_fences(answer).trim();
    if body.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| TranslationError::MalformedResponse(format!("{} in '{}'", e, truncate_text(body, 80))))?;

    let Value::Object(object) = value else {
        return Err(TranslationError::MalformedResponse(format!(
            "expected a JSON object, got '{}'",
            truncate_text(body, 80)
        )));
    };

    let translations: TranslationMap = object
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) if !key.trim().is_empty() && !text.trim().is_empty() => Some((key, text)),
            _ => None,
        })
        .collect();

    if translations.is_empty() {
        return Err(TranslationError::EmptyResponse);
    }

    let unrequested = translations.keys().filter(|key| !requested.contains_key(*key)).count();
    if unrequested > 0 {
        debug!("Translation answer carries {} unrequested keys", unrequested);
    }

    Ok(translations)
}
