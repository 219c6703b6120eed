/*!
 * Textual insertion anchors.
 *
 * Anchors are found per run by matching single lines against the rule
 * table's patterns; they are never persisted and may legitimately be absent.
 */

use std::fmt;

use super::rules::PlotRules;

/// Kind of line used as an insertion point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// The plotting-library import statement
    ImportLine,
    /// The figure-display call
    DisplayCallLine,
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImportLine => write!(f, "import-line"),
            Self::DisplayCallLine => write!(f, "display-call-line"),
        }
    }
}

/// A located anchor: zero-based line index plus its kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionAnchor {
    pub line: usize,
    pub kind: AnchorKind,
}

impl InjectionAnchor {
    /// Find the first line matching the pattern for `kind`
    pub fn locate<S: AsRef<str>>(lines: &[S], kind: AnchorKind, rules: &PlotRules) -> Option<Self> {
        let pattern = match kind {
            AnchorKind::ImportLine => &rules.import_pattern,
            AnchorKind::DisplayCallLine => &rules.display_pattern,
        };

        lines
            .iter()
            .position(|line| pattern.is_match(line.as_ref()))
            .map(|line| Self { line, kind })
    }

    /// Leading whitespace of the anchor line
    pub fn indentation<'l, S: AsRef<str>>(&self, lines: &'l [S]) -> &'l str {
        let line = lines.get(self.line).map(AsRef::as_ref).unwrap_or("");
        &line[..line.len() - line.trim_start().len()]
    }
}

/// Prefix every non-blank line with `indent`
pub(crate) fn indented<I, S>(indent: &str, lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| match line.as_ref() {
            "" => String::new(),
            text => format!("{indent}{text}"),
        })
        .collect()
}

/// Result of an anchor-based injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionOutcome {
    /// Lines were inserted relative to the anchor
    Inserted(InjectionAnchor),
    /// The content was already present; nothing changed
    AlreadyPresent,
    /// No anchor line exists; nothing changed
    AnchorMissing(AnchorKind),
}
