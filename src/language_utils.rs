use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Codes name the source and target languages of label translation. Both
/// ISO 639-1 (`zh`) and ISO 639-2 codes (`zho`, or the bibliographic `chi`)
/// are accepted everywhere.

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve a 2- or 3-letter code to a language
fn resolve(code: &str) -> Result<Language> {
    let normalized = code.trim().to_lowercase();

    let language = match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let terminological = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized)
                .map(|(_, terminological)| *terminological)
                .unwrap_or(normalized.as_str());
            Language::from_639_3(terminological)
        }
        _ => None,
    };

    language.ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    Ok(resolve(code)?.to_639_3().to_string())
}

/// Normalize to ISO 639-1 when the language has one, else ISO 639-2/T
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let language = resolve(code)?;
    Ok(language
        .to_639_1()
        .unwrap_or_else(|| language.to_639_3())
        .to_string())
}

/// Check if two language codes represent the same language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (resolve(code1), resolve(code2)) {
        (Ok(first), Ok(second)) => first == second,
        _ => false,
    }
}

/// English name of the language, as used in prompts
pub fn get_language_name(code: &str) -> Result<String> {
    Ok(resolve(code)?.to_name().to_string())
}
