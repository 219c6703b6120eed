/*!
 * Idempotent font-support injection.
 */

use super::anchors::{AnchorKind, InjectionAnchor, InjectionOutcome, indented};
use super::rules::PlotRules;

/// Text produced by an injection plus what happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub text: String,
    pub outcome: InjectionOutcome,
}

impl Injection {
    pub(crate) fn unchanged(text: &str, outcome: InjectionOutcome) -> Self {
        Self {
            text: text.to_string(),
            outcome,
        }
    }
}

/// Inserts the rule table's font block right after the library import,
/// at the import's indentation
pub struct FontSupportInjector<'r> {
    rules: &'r PlotRules,
}

impl<'r> FontSupportInjector<'r> {
    pub fn new(rules: &'r PlotRules) -> Self {
        Self { rules }
    }

    /// Insert the font block unless the marker line already exists anywhere
    pub fn inject(&self, text: &str) -> Injection {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

        if lines.iter().any(|line| line.contains(self.rules.font_marker.as_str())) {
            return Injection::unchanged(text, InjectionOutcome::AlreadyPresent);
        }

        let Some(anchor) = InjectionAnchor::locate(&lines, AnchorKind::ImportLine, self.rules) else {
            return Injection::unchanged(text, InjectionOutcome::AnchorMissing(AnchorKind::ImportLine));
        };

        let block = indented(anchor.indentation(&lines), &self.rules.font_block);
        let insert_at = anchor.line + 1;
        lines.splice(insert_at..insert_at, block);

        Injection {
            text: lines.join("\n"),
            outcome: InjectionOutcome::Inserted(anchor),
        }
    }
}
