/*!
 * Structural extraction of translatable text.
 *
 * Candidates come from two places: string literals passed to the labeling
 * calls named in the rule table (positional or keyword), and full-line
 * comments that contain at least one Latin letter. The result maps every
 * candidate to itself and is what the translation gateway receives.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use tree_sitter::Node;

use super::TranslationMap;
use super::document::SourceDocument;
use super::rules::PlotRules;

/// Source encoding declaration, honoured by Python on the first two lines only
static ENCODING_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t\f]*#.*?coding[:=][ \t]*[-\w.]+").expect("valid encoding pattern")
});

/// Collects literal candidates from a parsed document
pub struct StructuralExtractor<'r> {
    rules: &'r PlotRules,
}

impl<'r> StructuralExtractor<'r> {
    /// Create an extractor for the given rule table
    pub fn new(rules: &'r PlotRules) -> Self {
        Self { rules }
    }

    /// Collect every distinct candidate in the document
    pub fn extract(&self, doc: &SourceDocument) -> TranslationMap {
        let mut candidates = TranslationMap::new();

        self.collect_call_literals(doc, &mut candidates);
        let literal_count = candidates.len();

        collect_comment_lines(doc.text(), &mut candidates);

        debug!(
            "Extracted {} call literals and {} comment lines",
            literal_count,
            candidates.len() - literal_count
        );

        candidates
    }

    fn collect_call_literals(&self, doc: &SourceDocument, out: &mut TranslationMap) {
        let mut stack = vec![doc.root()];

        while let Some(node) = stack.pop() {
            if node.kind() == "call" {
                self.visit_call(doc, node, out);
            }

            let mut cursor = node.walk();
            stack.extend(node.children(&mut cursor));
        }
    }

    fn visit_call(&self, doc: &SourceDocument, call: Node<'_>, out: &mut TranslationMap) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };

        // Only member calls (`plt.title`, `ax.set_xlabel`) are recognised.
        if function.kind() != "attribute" {
            return;
        }

        let Some(member) = function.child_by_field_name("attribute") else {
            return;
        };
        if !self.rules.is_labeling_call(doc.node_text(member)) {
            return;
        }

        let Some(arguments) = call.child_by_field_name("arguments") else {
            return;
        };

        // Implicitly concatenated literals (`'a' 'b'`) are a `concatenated_string`
        // and skipped: the merge rewrites one quoted literal at a time and
        // could not put the joined translation back.
        let mut cursor = arguments.walk();
        for argument in arguments.named_children(&mut cursor) {
            let value = match argument.kind() {
                "string" => Some(argument),
                "keyword_argument" => argument.child_by_field_name("value"),
                _ => None,
            };

            if let Some(literal) = value.and_then(|node| string_literal_value(doc, node)) {
                if !literal.trim().is_empty() {
                    out.insert(literal.clone(), literal);
                }
            }
        }
    }
}

/// Raw contents of a plain string literal.
///
/// f-strings and byte strings are not text constants and yield `None`.
fn string_literal_value(doc: &SourceDocument, node: Node<'_>) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut start = None;
    let mut end = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "string_start" => start = Some(child),
            "string_end" => end = Some(child),
            "interpolation" => return None,
            _ => {}
        }
    }

    let (start, end) = (start?, end?);
    let prefix = doc.node_text(start).to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    doc.text()
        .get(start.end_byte()..end.start_byte())
        .map(str::to_string)
}

/// Add the text of every standalone comment line containing a Latin letter.
///
/// A shebang on the first line and an encoding declaration on either of the
/// first two lines are directives, not prose.
fn collect_comment_lines(text: &str, out: &mut TranslationMap) {
    for (index, line) in text.split('\n').enumerate() {
        let stripped = line.trim();

        if index == 0 && stripped.starts_with("#!") {
            continue;
        }
        if index < 2 && ENCODING_DECLARATION.is_match(line) {
            continue;
        }

        if let Some(rest) = stripped.strip_prefix('#') {
            let comment = rest.trim();
            if !comment.is_empty() && comment.chars().any(|c| c.is_ascii_alphabetic()) {
                out.insert(comment.to_string(), comment.to_string());
            }
        }
    }
}
