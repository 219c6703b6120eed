/*!
 * Source-rewriting stages.
 *
 * Each stage takes text and returns new text; none of them perform I/O or
 * talk to external services. The orchestrator in `crate::pipeline` threads
 * the text through them in order.
 */

use std::collections::BTreeMap;

pub mod anchors;
pub mod document;
pub mod extractor;
pub mod font;
pub mod merger;
pub mod rules;
pub mod savefig;
pub mod style;

/// Original literal to translated literal
pub type TranslationMap = BTreeMap<String, String>;

pub use anchors::{AnchorKind, InjectionAnchor, InjectionOutcome};
pub use document::SourceDocument;
pub use extractor::StructuralExtractor;
pub use font::{FontSupportInjector, Injection};
pub use merger::TextMerger;
pub use rules::PlotRules;
pub use savefig::{SaveDirectiveInjector, VectorFormat};
pub use style::{
    DEFAULT_PRESET, Layout, PresetTable, ResolvedStyle, StyleComposer, StyleConfig, StyleOverrides,
    StylePreset,
};
