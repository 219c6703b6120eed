/*!
 * Declarative rule table for one plotting library.
 *
 * Everything the rewriting stages know about the target library lives here:
 * the labeling calls whose string arguments are translatable, the textual
 * anchors used as insertion points, the font-support block and the tokens
 * used to sanity-check a holistic rewrite. Supporting another library means
 * building another `PlotRules` value, not touching the stages.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

/// `import matplotlib.pyplot as plt`, anywhere on the line
static MATPLOTLIB_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"import\s+matplotlib\.pyplot\s+as\s+plt").expect("valid import pattern"));

/// `plt.show()` at the start of a line, after indentation
static MATPLOTLIB_SHOW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*plt\.show\(\)").expect("valid display pattern"));

/// Rules describing how a plotting library is recognised in a script
#[derive(Debug, Clone)]
pub struct PlotRules {
    /// Human readable library name
    pub library: String,

    /// Member names of calls whose string arguments are translatable
    pub labeling_calls: BTreeSet<String>,

    /// Matches the library import line
    pub import_pattern: Regex,

    /// Matches the figure-display call line
    pub display_pattern: Regex,

    /// Alias the script uses for the plotting module
    pub module_alias: String,

    /// Line whose presence means font support is already configured
    pub font_marker: String,

    /// Lines inserted after the import to enable CJK glyph rendering
    pub font_block: Vec<String>,

    /// A rewritten document must contain at least one of these tokens
    pub code_tokens: Vec<String>,
}

impl PlotRules {
    /// Rules for matplotlib's pyplot interface
    pub fn matplotlib() -> Self {
        let labeling_calls = [
            "title",
            "xlabel",
            "ylabel",
            "suptitle",
            "set_title",
            "set_xlabel",
            "set_ylabel",
            "text",
            "legend",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self {
            library: "matplotlib".to_string(),
            labeling_calls,
            import_pattern: MATPLOTLIB_IMPORT.clone(),
            display_pattern: MATPLOTLIB_SHOW.clone(),
            module_alias: "plt".to_string(),
            font_marker: "plt.rcParams['font.sans-serif']".to_string(),
            font_block: vec![
                "# --- CJK font support ---".to_string(),
                "plt.rcParams['font.sans-serif'] = ['SimHei']".to_string(),
                "plt.rcParams['axes.unicode_minus'] = False".to_string(),
                "# --------------------------".to_string(),
            ],
            code_tokens: vec!["import".to_string(), "plt".to_string()],
        }
    }

    /// Whether a call with this member name carries translatable labels
    pub fn is_labeling_call(&self, member: &str) -> bool {
        self.labeling_calls.contains(member)
    }

    /// Whether the text contains any token that marks it as code
    pub fn looks_like_code(&self, text: &str) -> bool {
        self.code_tokens.iter().any(|token| text.contains(token.as_str()))
    }
}

impl Default for PlotRules {
    fn default() -> Self {
        Self::matplotlib()
    }
}
