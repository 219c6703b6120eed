/*!
 * Translation caching functionality.
 *
 * Labels repeat heavily across the scripts of one project ("Time (s)",
 * "Accuracy"), so translations are cached per process and reused by every
 * run that shares the cache.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key combining source text, source language, and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    source_language: String,
    target_language: String,
}

impl CacheKey {
    fn new(source_text: &str, source_language: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Shared translation cache; clones share storage
#[derive(Debug, Clone)]
pub struct TranslationCache {
    entries: Arc<RwLock<HashMap<CacheKey, String>>>,
    stats: Arc<RwLock<CacheStats>>,
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            enabled,
        }
    }

    /// Get a translation from the cache
    pub fn get(&self, source_text: &str, source_language: &str, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, source_language, target_language);
        let found = self.entries.read().get(&key).cloned();

        let mut stats = self.stats.write();
        if found.is_some() {
            stats.hits += 1;
            debug!("Cache hit for '{}'", truncate_text(source_text, 30));
        } else {
            stats.misses += 1;
        }

        found
    }

    /// Store a translation in the cache
    pub fn store(&self, source_text: &str, source_language: &str, target_language: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(source_text, source_language, target_language);
        self.entries.write().insert(key, translation.to_string());
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    /// Clear entries and counters
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.stats.write() = CacheStats::default();
        debug!("Translation cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
