/*!
 * Natural-language instruction list for the holistic rewrite.
 */

use crate::source::style::{py_float, py_number};
use crate::source::{PlotRules, PresetTable, SaveDirectiveInjector, StyleComposer};

use super::options::RunOptions;

/// Build the ordered instructions for the active options.
///
/// Order: layout rebalancing, academic style, custom overrides, export.
pub fn build_instructions(
    options: &RunOptions,
    presets: &PresetTable,
    rules: &PlotRules,
    figure_name: &str,
) -> Vec<String> {
    let mut instructions = Vec::new();
    let alias = &rules.module_alias;

    if options.beautify_layout {
        instructions.push(
            "Rebalance the subplot layout: if the script creates several subplots stacked in a single \
             row or column (for example 4x1 or 1x4), restructure them into a more balanced grid \
             (for example 2x2) so the figure is compact and professional."
                .to_string(),
        );
    }

    if let Some(style_config) = &options.style {
        let style = StyleComposer::new(presets).resolve(style_config);
        let families = style.font_family.join(", ");

        instructions.push(format!(
            "Apply the {name} academic publication style: inject `{alias}.rcParams.update()` to set fonts \
             globally, using CJK-capable fonts ({families}). Font sizes in pt: title {title}, axis labels \
             {label}, tick labels {tick}, legend {legend}. Set the `figsize` of the call that creates the \
             figure (`{alias}.figure()` or `{alias}.subplots()`) to {figsize} ({name} {layout} width). \
             Set the resolution to {dpi} DPI. Keep any existing CJK font configuration intact.",
            name = style.preset_name,
            title = py_number(style.title_size),
            label = py_number(style.label_size),
            tick = py_number(style.tick_size),
            legend = py_number(style.legend_size),
            figsize = style.figsize_literal(),
            layout = style.layout.label(),
            dpi = style.dpi,
        ));

        let overrides = &style_config.overrides;
        if !overrides.is_empty() {
            let mut settings = Vec::new();
            if let Some(size) = overrides.font_size {
                settings.push(format!("global font size {} pt", py_number(size)));
            }
            if let Some(size) = overrides.title_size {
                settings.push(format!("title font size {} pt", py_number(size)));
            }
            if let Some(width) = overrides.fig_width {
                settings.push(format!("figure width {} in", py_float(width)));
            }
            if let Some(height) = overrides.fig_height {
                settings.push(format!("figure height {} in", py_float(height)));
            }
            if let Some(dpi) = overrides.dpi {
                settings.push(format!("resolution {} DPI", dpi));
            }
            instructions.push(format!("Apply these custom settings: {}.", settings.join("; ")));
        }
    }

    if options.vector_format.is_some() {
        let directive = SaveDirectiveInjector::new(rules).directive(figure_name, options.export_dpi(presets));
        instructions.push(format!(
            "Save the figure as a vector graphic: immediately before `{alias}.show()` insert exactly \
             `{directive}`."
        ));
    }

    instructions
}
