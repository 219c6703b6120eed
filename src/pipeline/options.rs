/*!
 * Caller-supplied options for one run.
 */

use std::path::PathBuf;

use crate::app_config::Config;
use crate::source::{PresetTable, ResolvedStyle, StyleConfig, VectorFormat};

/// What a run should do; read-only once the run starts
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    /// Translate extracted literals
    pub translate: bool,

    /// Ask the rewrite service for a more balanced subplot layout
    pub beautify_layout: bool,

    /// Academic styling; `None` disables it
    pub style: Option<StyleConfig>,

    /// Export the figure in this format
    pub vector_format: Option<VectorFormat>,

    /// Directory for the revised script; the input's directory when unset
    pub output_dir: Option<PathBuf>,

    pub revision_suffix: String,
    pub figure_suffix: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            translate: true,
            beautify_layout: false,
            style: None,
            vector_format: None,
            output_dir: None,
            revision_suffix: "zh_revision".to_string(),
            figure_suffix: "figure".to_string(),
        }
    }
}

impl RunOptions {
    /// Options taken from the configuration file
    pub fn from_config(config: &Config) -> Self {
        let defaults = &config.style;
        Self {
            translate: true,
            beautify_layout: defaults.beautify_layout,
            style: defaults.enabled.then(|| defaults.style.clone()),
            vector_format: defaults.vector_format,
            output_dir: config.output.output_dir.clone(),
            revision_suffix: config.output.revision_suffix.clone(),
            figure_suffix: config.output.figure_suffix.clone(),
        }
    }

    /// Whether any option needs the holistic rewrite
    pub fn wants_restyle(&self) -> bool {
        self.beautify_layout || self.style.is_some() || self.vector_format.is_some()
    }

    /// Resolution for the export directive
    pub fn export_dpi(&self, presets: &PresetTable) -> u32 {
        let config = self.style.clone().unwrap_or_default();
        ResolvedStyle::resolve(presets, &config).dpi
    }
}
