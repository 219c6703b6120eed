/*!
 * Common test utilities for the academicplot test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use academicplot::errors::{ProviderError, RewriteError, TranslationError};
use academicplot::pipeline::Pipeline;
use academicplot::services::{HolisticRewriter, TranslationGateway};
use academicplot::source::{PlotRules, PresetTable, TranslationMap};

/// A small script with every kind of translatable text
pub const SINE_SCRIPT: &str = "import numpy as np
import matplotlib.pyplot as plt

# Generate data
x = np.linspace(0, 10, 100)
plt.plot(x, np.sin(x), label='Sine')
plt.title('Sine wave')
plt.xlabel('Time (s)')
plt.ylabel(\"Amplitude\")
plt.text(5, 0.5, 'Sine')
plt.legend()
plt.show()
";

/// Route `log` output through the test harness; safe to call repeatedly
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Pipeline with the standard rules and no services
pub fn bare_pipeline() -> Pipeline {
    Pipeline::new(Arc::new(PlotRules::matplotlib()), Arc::new(PresetTable::standard()))
}

/// Build a translation map from pairs
pub fn translation_map(pairs: &[(&str, &str)]) -> TranslationMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Translator answering from a fixed dictionary, or failing
pub struct FakeTranslator {
    dictionary: Option<TranslationMap>,
    /// Answer every dictionary entry, requested or not
    whole_dictionary: bool,
    calls: AtomicUsize,
}

impl FakeTranslator {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            dictionary: Some(translation_map(pairs)),
            whole_dictionary: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answers with all of `pairs` regardless of what was asked
    pub fn answering_all(pairs: &[(&str, &str)]) -> Self {
        Self {
            whole_dictionary: true,
            ..Self::with(pairs)
        }
    }

    pub fn failing() -> Self {
        Self {
            dictionary: None,
            whole_dictionary: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TranslationGateway for FakeTranslator {
    async fn translate(&self, texts: &TranslationMap) -> Result<TranslationMap, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(dictionary) = &self.dictionary else {
            return Err(TranslationError::Provider(ProviderError::ConnectionError(
                "connection refused".to_string(),
            )));
        };

        if self.whole_dictionary {
            return Ok(dictionary.clone());
        }

        Ok(texts
            .keys()
            .filter_map(|key| dictionary.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }
}

/// What the fake rewriter answers
pub enum RewriteAnswer {
    /// Return this document
    Code(String),
    /// Return chatty prose that is not code
    Prose,
    /// Fail at the transport level
    Error,
}

/// Rewriter with a scripted answer that records the instructions it saw
pub struct FakeRewriter {
    answer: RewriteAnswer,
    seen: parking_lot::Mutex<Vec<Vec<String>>>,
}

impl FakeRewriter {
    pub fn new(answer: RewriteAnswer) -> Self {
        Self {
            answer,
            seen: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Instruction lists received so far
    pub fn seen(&self) -> Vec<Vec<String>> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl HolisticRewriter for FakeRewriter {
    async fn rewrite(&self, _document: &str, instructions: &[String]) -> Result<String, RewriteError> {
        self.seen.lock().push(instructions.to_vec());

        match &self.answer {
            RewriteAnswer::Code(code) => Ok(code.clone()),
            RewriteAnswer::Prose => Ok("Sure! I have restyled your figure as requested.".to_string()),
            RewriteAnswer::Error => Err(RewriteError::Provider(ProviderError::Timeout(180))),
        }
    }
}

/// Text after inserting the standard font block right after `import_line`
pub fn with_font_block(text: &str, import_line: usize) -> String {
    let rules = PlotRules::matplotlib();
    let mut lines: Vec<&str> = text.split('\n').collect();
    let at = import_line + 1;
    lines.splice(at..at, rules.font_block.iter().map(String::as_str));
    lines.join("\n")
}
