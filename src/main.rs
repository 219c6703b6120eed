// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use academicplot::app_config::{self, Config, ServiceProvider};
use academicplot::app_controller::Controller;
use academicplot::pipeline::RunOptions;
use academicplot::services;
use academicplot::source::{Layout, PresetTable, StyleConfig, VectorFormat};
use academicplot::source::style::py_number;

/// CLI Wrapper for ServiceProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliServiceProvider {
    #[value(name = "deepseek")]
    DeepSeek,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
}

impl From<CliServiceProvider> for ServiceProvider {
    fn from(cli_provider: CliServiceProvider) -> Self {
        match cli_provider {
            CliServiceProvider::DeepSeek => ServiceProvider::DeepSeek,
            CliServiceProvider::OpenAI => ServiceProvider::OpenAI,
            CliServiceProvider::Anthropic => ServiceProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for Layout
#[derive(Debug, Clone, ValueEnum)]
enum CliLayout {
    Single,
    Double,
}

impl From<CliLayout> for Layout {
    fn from(cli_layout: CliLayout) -> Self {
        match cli_layout {
            CliLayout::Single => Layout::Single,
            CliLayout::Double => Layout::Double,
        }
    }
}

/// CLI Wrapper for VectorFormat
#[derive(Debug, Clone, ValueEnum)]
enum CliVectorFormat {
    Pdf,
    Svg,
    Eps,
}

impl From<CliVectorFormat> for VectorFormat {
    fn from(cli_format: CliVectorFormat) -> Self {
        match cli_format {
            CliVectorFormat::Pdf => VectorFormat::Pdf,
            CliVectorFormat::Svg => VectorFormat::Svg,
            CliVectorFormat::Eps => VectorFormat::Eps,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate and restyle plot scripts (default command)
    #[command(alias = "revise")]
    Process(ProcessArgs),

    /// Validate the configuration and test the generation service
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,
    },

    /// List the academic style presets
    Presets,

    /// Generate shell completions for academicplot
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct ProcessArgs {
    /// Plot script or directory of scripts to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Generation service provider
    #[arg(short, long, value_enum)]
    provider: Option<CliServiceProvider>,

    /// Model name to use
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code of the labels (e.g., 'en')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'zh')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Keep the labels untranslated
    #[arg(long)]
    no_translate: bool,

    /// Academic style preset (nature, neurips, cvpr, science, ieee)
    #[arg(long, alias = "preset", value_name = "PRESET")]
    style: Option<String>,

    /// Column layout for the figure size
    #[arg(long, value_enum)]
    layout: Option<CliLayout>,

    /// Resolution in DPI, used when --dpi is not given
    #[arg(long)]
    resolution: Option<u32>,

    /// Global font size in pt
    #[arg(long)]
    font_size: Option<f64>,

    /// Title font size in pt
    #[arg(long)]
    title_size: Option<f64>,

    /// Figure width in inches
    #[arg(long)]
    fig_width: Option<f64>,

    /// Figure height in inches
    #[arg(long)]
    fig_height: Option<f64>,

    /// Resolution in DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// Rebalance stacked subplots into a grid
    #[arg(short, long)]
    beautify: bool,

    /// Export the figure as a vector graphic
    #[arg(long, value_enum)]
    vector_format: Option<CliVectorFormat>,

    /// Directory for the revised scripts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl ProcessArgs {
    fn has_style_flags(&self) -> bool {
        self.style.is_some()
            || self.layout.is_some()
            || self.resolution.is_some()
            || self.font_size.is_some()
            || self.title_size.is_some()
            || self.fig_width.is_some()
            || self.fig_height.is_some()
            || self.dpi.is_some()
    }

    /// Apply the command-line overrides on top of the configuration
    fn apply_to_config(&self, config: &mut Config) {
        if let Some(provider) = &self.provider {
            config.service.provider = provider.clone().into();
        }
        if let Some(model) = &self.model {
            config.service.active_provider_config_mut().model = model.clone();
        }
        if let Some(source_lang) = &self.source_language {
            config.source_language = source_lang.clone();
        }
        if let Some(target_lang) = &self.target_language {
            config.target_language = target_lang.clone();
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone().into();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output.output_dir = Some(output_dir.clone());
        }
    }

    /// Options for every run of this invocation
    fn run_options(&self, config: &Config) -> RunOptions {
        let mut options = RunOptions::from_config(config);

        if self.no_translate {
            options.translate = false;
        }
        if self.beautify {
            options.beautify_layout = true;
        }
        if let Some(format) = &self.vector_format {
            options.vector_format = Some(format.clone().into());
        }

        if self.has_style_flags() {
            let mut style: StyleConfig = options.style.take().unwrap_or_else(|| config.style.style.clone());
            if let Some(preset) = &self.style {
                style.preset = preset.clone();
            }
            if let Some(layout) = &self.layout {
                style.layout = layout.clone().into();
            }
            style.resolution = self.resolution.or(style.resolution);
            style.overrides.font_size = self.font_size.or(style.overrides.font_size);
            style.overrides.title_size = self.title_size.or(style.overrides.title_size);
            style.overrides.fig_width = self.fig_width.or(style.overrides.fig_width);
            style.overrides.fig_height = self.fig_height.or(style.overrides.fig_height);
            style.overrides.dpi = self.dpi.or(style.overrides.dpi);
            options.style = Some(style);
        }

        options
    }
}

/// academicplot - Publication-ready revisions of matplotlib scripts
///
/// Translates the labels of a plotting script, adds CJK font support and
/// optionally restyles the figure for an academic venue.
#[derive(Parser, Debug)]
#[command(name = "academicplot")]
#[command(version)]
#[command(about = "Translate and restyle matplotlib plotting scripts")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "academicplot rewrites a matplotlib script: it translates titles, axis labels and legends, \
injects CJK font support, and can restyle the figure for a publication venue.

EXAMPLES:
    academicplot plot.py                            # Translate labels using the default config
    academicplot -f plot.py                         # Force overwrite an existing revision
    academicplot --style ieee --layout double plot.py
    academicplot --style nature --font-size 9 --dpi 600 plot.py
    academicplot --vector-format pdf plot.py        # Also save the figure as PDF
    academicplot -b --no-translate plot.py          # Only rebalance the subplot layout
    academicplot ./figures/                         # Process every script in a directory
    academicplot check                              # Test the configured service
    academicplot completions bash > academicplot.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    deepseek  - DeepSeek API (default, DEEPSEEK_API_KEY)
    openai    - OpenAI API (OPENAI_API_KEY)
    anthropic - Anthropic API (ANTHROPIC_API_KEY)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    process: ProcessArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "[x]",
            Level::Warn => "[!]",
            Level::Info => "",
            Level::Debug => "[?]",
            Level::Trace => "[.]",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_marker_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set from the config later
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "academicplot", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Presets) => {
            list_presets();
            Ok(())
        }
        Some(Commands::Check { config_path }) => run_check(&config_path).await,
        Some(Commands::Process(args)) => run_process(args).await,
        None => run_process(cli.process).await,
    }
}

fn list_presets() {
    let presets = PresetTable::standard();
    for preset in presets.iter() {
        println!(
            "{:<8} {:<8} single {:>4} x {:<4} double {:>4} x {:<4} title {:>4} pt  label {:>4} pt  {} dpi",
            preset.id,
            preset.name,
            py_number(preset.single_column.0),
            py_number(preset.single_column.1),
            py_number(preset.double_column.0),
            py_number(preset.double_column.1),
            py_number(preset.title_size),
            py_number(preset.label_size),
            preset.dpi
        );
    }
}

async fn run_check(config_path: &Path) -> Result<()> {
    let config = Config::load_or_create(config_path)?;
    log::set_max_level(config.log_level.to_level_filter());

    config.validate().context("Configuration validation failed")?;
    config.validate_credentials()?;

    info!(
        "Testing {} ({})...",
        config.service.provider.display_name(),
        config.service.get_model()
    );
    services::test_connection(&config)
        .await
        .context("Connection test failed")?;
    info!("Connection OK");

    Ok(())
}

async fn run_process(args: ProcessArgs) -> Result<()> {
    if let Some(cmd_log_level) = &args.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let input_path = args
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    let mut config = Config::load_or_create(&args.config_path)?;
    args.apply_to_config(&mut config);

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let options = args.run_options(&config);
    let controller = Controller::with_config(config)?.with_options(options);

    let summary = if input_path.is_file() {
        controller.run(input_path, args.force_overwrite).await?
    } else if input_path.is_dir() {
        controller.run_folder(input_path, args.force_overwrite).await?
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    };

    if summary.has_failures() {
        return Err(anyhow!("{} file(s) failed", summary.failed));
    }

    Ok(())
}
