/*!
 * Prompt templates for the translation and rewrite requests.
 */

use crate::source::TranslationMap;

/// System prompt for batch label translation.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub const LABEL_TRANSLATOR: &'static str = r#"You are a precise translation engine for scientific figures.
Translate the values of the JSON object you receive from {source_language} into concise, professional, idiomatic {target_language}.

## Rules
- Keep every key exactly as given; translate only the values
- Keep units, symbols, LaTeX ($...$) and format placeholders unchanged
- Return ONLY a JSON object, without explanations or markdown fences"#;

    pub const FIGURE_REWRITER: &'static str = r#"You are an expert in Python data visualisation who prepares publication-quality figures for academic journals.
You receive a plotting script and a numbered list of requirements. Refactor the script to satisfy them.

## Core requirement
Preserve the original intent: keep the data processing, the plot types and every existing label and comment, including translated ones. You restyle and normalise; you never change what the figure shows.

## Output rules
- Answer with the complete, runnable Python script and nothing else
- No explanations, preamble or closing remarks
- No markdown fences such as ```python"#;

    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn label_translator() -> Self {
        Self::new(Self::LABEL_TRANSLATOR)
    }

    /// Render the template with the given language names.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// User message carrying the texts to translate as a JSON object
pub fn translation_prompt(texts: &TranslationMap) -> Result<String, serde_json::Error> {
    let payload = serde_json::to_string_pretty(texts)?;
    Ok(format!("Input:\n{}\n\nOutput:", payload))
}

/// User message carrying the script and its numbered requirements
pub fn rewrite_prompt(document: &str, instructions: &[String]) -> String {
    let requirements = instructions
        .iter()
        .enumerate()
        .map(|(i, instruction)| format!("{}. {}", i + 1, instruction))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "## Requirements\n{}\n\n## Original script\n```python\n{}\n```",
        requirements, document
    )
}
