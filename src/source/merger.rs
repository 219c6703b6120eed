/*!
 * Merge translated text back into the document.
 *
 * Substitution is purely textual and runs in two passes per candidate: quoted
 * literal occurrences (single and double quotes), then comment lines that
 * start with `# text` or `#text`. Keys are processed longest first so a
 * short literal never rewrites part of a longer one before the longer one has
 * been substituted. The order covers every key the translation service
 * returned, including literals the extractor did not report.
 */

use std::collections::BTreeSet;

use super::TranslationMap;

/// Rewrites original literals with their translations
pub struct TextMerger;

impl TextMerger {
    /// Apply `translations` to the text, returning the new text.
    ///
    /// Candidates missing from `translations` keep their original value.
    pub fn apply(text: &str, candidates: &TranslationMap, translations: &TranslationMap) -> String {
        let mut merged = text.to_string();

        for original in Self::merge_order(candidates, translations) {
            let translated = translations
                .get(original)
                .map(String::as_str)
                .unwrap_or(original);

            if original.trim().is_empty() || translated == original {
                continue;
            }

            merged = replace_quoted(&merged, original, translated);
            merged = replace_in_comments(&merged, original, translated);
        }

        merged
    }

    /// Union of candidate and translation keys, by descending character length.
    ///
    /// Ties are broken lexicographically so the order is fully deterministic.
    pub fn merge_order<'a>(candidates: &'a TranslationMap, translations: &'a TranslationMap) -> Vec<&'a str> {
        let mut keys: Vec<&str> = candidates
            .keys()
            .chain(translations.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        keys.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        keys
    }
}

fn replace_quoted(text: &str, original: &str, translated: &str) -> String {
    text.replace(&format!("\"{original}\""), &format!("\"{translated}\""))
        .replace(&format!("'{original}'"), &format!("'{translated}'"))
}

fn replace_in_comments(text: &str, original: &str, translated: &str) -> String {
    let spaced = format!("# {original}");
    let tight = format!("#{original}");

    text.split('\n')
        .map(|line| {
            let stripped = line.trim();
            if stripped.starts_with(&spaced) || stripped.starts_with(&tight) {
                line.replace(original, translated)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
