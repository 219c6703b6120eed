/*!
 * Publication style presets and the deterministic style block.
 *
 * The preset table is built once and shared read-only between runs. Composing
 * a block is a pure function of (table, config): no I/O, no randomness, so the
 * same inputs always render byte-identical text.
 */

use log::warn;
use serde::{Deserialize, Serialize};

use super::anchors::{AnchorKind, InjectionAnchor, InjectionOutcome, indented};
use super::font::Injection;
use super::rules::PlotRules;

/// Identifier of the preset used when a lookup fails
pub const DEFAULT_PRESET: &str = "nature";

/// Named bundle of styling defaults for one venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    /// Lookup identifier (e.g. "nature")
    pub id: String,
    /// Display name (e.g. "Nature")
    pub name: String,
    /// Figure size in inches for a single-column figure
    pub single_column: (f64, f64),
    /// Figure size in inches for a double-column figure
    pub double_column: (f64, f64),
    /// Font family fallback list, CJK-capable fonts first
    pub font_family: Vec<String>,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub legend_size: f64,
    pub dpi: u32,
}

/// Read-only lookup from preset identifier to preset
#[derive(Debug, Clone)]
pub struct PresetTable {
    presets: Vec<StylePreset>,
    /// Position of `DEFAULT_PRESET`
    default_index: usize,
}

impl PresetTable {
    /// The built-in venue presets
    pub fn standard() -> Self {
        let wide_cjk = vec![
            "SimHei".to_string(),
            "Microsoft YaHei".to_string(),
            "Arial".to_string(),
            "Helvetica".to_string(),
            "sans-serif".to_string(),
        ];
        let narrow_cjk = vec![
            "SimHei".to_string(),
            "Arial".to_string(),
            "sans-serif".to_string(),
        ];

        let journal = |id: &str, name: &str| StylePreset {
            id: id.to_string(),
            name: name.to_string(),
            single_column: (3.35, 2.5),
            double_column: (7.08, 4.0),
            font_family: wide_cjk.clone(),
            title_size: 12.0,
            label_size: 10.0,
            tick_size: 8.0,
            legend_size: 8.0,
            dpi: 300,
        };
        let conference = |id: &str, name: &str, title_size: f64| StylePreset {
            id: id.to_string(),
            name: name.to_string(),
            single_column: (3.5, 2.6),
            double_column: (7.2, 4.2),
            font_family: narrow_cjk.clone(),
            title_size,
            label_size: 9.0,
            tick_size: 8.0,
            legend_size: 8.0,
            dpi: 300,
        };

        Self {
            presets: vec![
                journal("nature", "Nature"),
                conference("neurips", "NeurIPS", 11.0),
                conference("cvpr", "CVPR", 11.0),
                journal("science", "Science"),
                conference("ieee", "IEEE", 10.0),
            ],
            default_index: 0,
        }
    }

    /// Build a table from explicit presets; the default id must be present
    pub fn from_presets(presets: Vec<StylePreset>) -> Option<Self> {
        let default_index = presets.iter().position(|p| p.id == DEFAULT_PRESET)?;
        Some(Self { presets, default_index })
    }

    /// Exact lookup
    pub fn lookup(&self, id: &str) -> Option<&StylePreset> {
        let id = id.trim().to_lowercase();
        self.presets.iter().find(|p| p.id == id)
    }

    /// Lookup falling back to the default preset for unknown identifiers
    pub fn get(&self, id: &str) -> &StylePreset {
        if let Some(preset) = self.lookup(id) {
            return preset;
        }

        warn!("Unknown style preset '{}', falling back to '{}'", id, DEFAULT_PRESET);
        &self.presets[self.default_index]
    }

    /// All presets in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &StylePreset> {
        self.presets.iter()
    }
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Column layout of the target figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Single,
    Double,
}

impl Layout {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single => "single-column",
            Self::Double => "double-column",
        }
    }
}

/// Caller-supplied values that replace preset fields one for one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fig_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fig_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Styling request for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Preset identifier
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default)]
    pub layout: Layout,

    /// Target resolution; the preset's value is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<u32>,

    #[serde(default)]
    pub overrides: StyleOverrides,
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            layout: Layout::default(),
            resolution: None,
            overrides: StyleOverrides::default(),
        }
    }
}

/// Every styling value after applying overrides to the preset
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub preset_name: String,
    pub layout: Layout,
    pub font_family: Vec<String>,
    pub font_size: f64,
    pub title_size: f64,
    pub label_size: f64,
    pub tick_size: f64,
    pub legend_size: f64,
    pub dpi: u32,
    pub figsize: (f64, f64),
}

impl ResolvedStyle {
    /// Merge `config` over the preset it names
    pub fn resolve(table: &PresetTable, config: &StyleConfig) -> Self {
        let preset = table.get(&config.preset);
        let overrides = &config.overrides;

        let base_size = match config.layout {
            Layout::Single => preset.single_column,
            Layout::Double => preset.double_column,
        };

        Self {
            preset_name: preset.name.clone(),
            layout: config.layout,
            font_family: preset.font_family.clone(),
            font_size: overrides.font_size.unwrap_or(preset.label_size),
            title_size: overrides.title_size.unwrap_or(preset.title_size),
            label_size: preset.label_size,
            tick_size: preset.tick_size,
            legend_size: preset.legend_size,
            dpi: overrides.dpi.or(config.resolution).unwrap_or(preset.dpi),
            figsize: (
                overrides.fig_width.unwrap_or(base_size.0),
                overrides.fig_height.unwrap_or(base_size.1),
            ),
        }
    }

    /// Python tuple literal for the figure size
    pub fn figsize_literal(&self) -> String {
        format!("({}, {})", py_float(self.figsize.0), py_float(self.figsize.1))
    }
}

/// Builds the deterministic `rcParams` block
pub struct StyleComposer<'t> {
    table: &'t PresetTable,
}

impl<'t> StyleComposer<'t> {
    pub fn new(table: &'t PresetTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, config: &StyleConfig) -> ResolvedStyle {
        ResolvedStyle::resolve(self.table, config)
    }

    /// Lines of the style block for `config`
    pub fn compose_lines(&self, config: &StyleConfig, rules: &PlotRules) -> Vec<String> {
        let style = self.resolve(config);
        let alias = &rules.module_alias;
        let families = style
            .font_family
            .iter()
            .map(|f| format!("'{}'", f.replace('\'', "\\'")))
            .collect::<Vec<_>>()
            .join(", ");

        let header = format!("# --- {} academic style ---", style.preset_name);
        let footer = format!("# {}", "-".repeat(header.len().saturating_sub(2)));

        vec![
            header,
            format!("{alias}.rcParams.update({{"),
            "    'font.family': 'sans-serif',".to_string(),
            format!("    'font.sans-serif': [{families}],"),
            format!("    'font.size': {},", py_number(style.font_size)),
            format!("    'axes.titlesize': {},", py_number(style.title_size)),
            format!("    'axes.labelsize': {},", py_number(style.label_size)),
            format!("    'xtick.labelsize': {},", py_number(style.tick_size)),
            format!("    'ytick.labelsize': {},", py_number(style.tick_size)),
            format!("    'legend.fontsize': {},", py_number(style.legend_size)),
            format!("    'figure.dpi': {},", style.dpi),
            format!(
                "    'figure.figsize': {},  # {} {} width",
                style.figsize_literal(),
                style.preset_name,
                style.layout.label()
            ),
            "})".to_string(),
            footer,
        ]
    }

    /// The style block as a single text value
    pub fn compose(&self, config: &StyleConfig, rules: &PlotRules) -> String {
        self.compose_lines(config, rules).join("\n")
    }

    /// Insert the style block right after the library import
    pub fn inject(&self, text: &str, config: &StyleConfig, rules: &PlotRules) -> Injection {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();

        let Some(anchor) = InjectionAnchor::locate(&lines, AnchorKind::ImportLine, rules) else {
            return Injection::unchanged(text, InjectionOutcome::AnchorMissing(AnchorKind::ImportLine));
        };

        let block = indented(anchor.indentation(&lines), self.compose_lines(config, rules));
        let insert_at = anchor.line + 1;
        lines.splice(insert_at..insert_at, block);

        Injection {
            text: lines.join("\n"),
            outcome: InjectionOutcome::Inserted(anchor),
        }
    }
}

/// Render a number the way Python prints an int or float literal
pub fn py_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Render a float that always reads as a Python float (`4.0`, not `4`)
pub fn py_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
