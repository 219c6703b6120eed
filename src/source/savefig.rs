/*!
 * Export directive insertion.
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::anchors::{AnchorKind, InjectionAnchor, InjectionOutcome};
use super::font::Injection;
use super::rules::PlotRules;

/// Vector formats the exported figure can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorFormat {
    Pdf,
    Svg,
    Eps,
}

impl VectorFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Eps => "eps",
        }
    }

    pub fn all() -> [Self; 3] {
        [Self::Pdf, Self::Svg, Self::Eps]
    }
}

impl fmt::Display for VectorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for VectorFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            "eps" => Ok(Self::Eps),
            other => Err(format!("Unsupported vector format: {}", other)),
        }
    }
}

/// Inserts `savefig` right before the figure-display call
pub struct SaveDirectiveInjector<'r> {
    rules: &'r PlotRules,
}

impl<'r> SaveDirectiveInjector<'r> {
    pub fn new(rules: &'r PlotRules) -> Self {
        Self { rules }
    }

    /// Export statement for `figure_name` without indentation
    pub fn directive(&self, figure_name: &str, dpi: u32) -> String {
        format!(
            "{}.savefig('{}', bbox_inches='tight', dpi={})",
            self.rules.module_alias,
            figure_name.replace('\'', "\\'"),
            dpi
        )
    }

    /// Insert the export statement before the first display call.
    ///
    /// The statement copies the display line's indentation so it stays in
    /// the same block.
    pub fn inject(&self, text: &str, figure_name: &str, dpi: u32) -> Injection {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

        let Some(anchor) = InjectionAnchor::locate(&lines, AnchorKind::DisplayCallLine, self.rules) else {
            return Injection::unchanged(text, InjectionOutcome::AnchorMissing(AnchorKind::DisplayCallLine));
        };

        let statement = format!("{}{}", anchor.indentation(&lines), self.directive(figure_name, dpi));

        lines.insert(anchor.line, statement);

        Injection {
            text: lines.join("\n"),
            outcome: InjectionOutcome::Inserted(anchor),
        }
    }
}
