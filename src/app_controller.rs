use anyhow::{Result, anyhow};
use futures::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::{FileManager, ISSUES_LOG_FILE};
use crate::pipeline::{EventKind, Pipeline, ProgressEvent, RunOptions};
use crate::services::{ServiceSet, TranslationCache};
use crate::source::{PlotRules, PresetTable};

// @module: Application controller for plot script revision

/// Outcome of one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// Revised script written; carries the path and the number of warnings
    Written(PathBuf, usize),
    /// Output already existed and overwrite was not forced
    Skipped(PathBuf),
    /// Terminal failure message
    Failed(String),
}

/// Totals of a controller invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outputs: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Written(path, warnings) => {
                self.outputs.push(path.clone());
                self.warnings += warnings;
            }
            FileOutcome::Skipped(_) => self.skipped += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn processed(&self) -> usize {
        self.outputs.len()
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared pipeline (rules, presets, services)
    pipeline: Pipeline,
    // @field: Translation cache shared by every file of this invocation
    cache: TranslationCache,
    // @field: Options applied to every run
    options: RunOptions,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller whose services come from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let cache = TranslationCache::new(config.service.common.cache_translations);

        let services = match config.validate_credentials() {
            Ok(()) => Some(ServiceSet::from_config(&config, cache.clone())?),
            Err(e) => {
                warn!("Running without generation services: {}", e);
                None
            }
        };

        Ok(Self::with_services(config, services, cache))
    }

    // @method: Create a controller with explicit services (or none)
    pub fn with_services(config: Config, services: Option<ServiceSet>, cache: TranslationCache) -> Self {
        let mut pipeline = Pipeline::new(Arc::new(PlotRules::matplotlib()), Arc::new(PresetTable::standard()));
        if let Some(services) = services {
            pipeline = pipeline.with_services(services);
        }

        let options = RunOptions::from_config(&config);

        Self {
            config,
            pipeline,
            cache,
            options,
            show_progress: true,
        }
    }

    /// Replace the run options derived from the configuration
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Disable progress bars (tests, non-interactive use)
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Revise a single script
    pub async fn run(&self, input_file: PathBuf, force_overwrite: bool) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let multi_progress = MultiProgress::new();
        let outcome = self.run_file(&input_file, &multi_progress, force_overwrite).await;

        let mut summary = RunSummary::default();
        summary.record(&outcome);

        if let FileOutcome::Failed(message) = &outcome {
            return Err(anyhow!("{}", message));
        }

        info!("Finished in {}", Self::format_duration(start_time.elapsed()));
        Ok(summary)
    }

    /// Revise every script under a directory, skipping previous outputs
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let scripts = FileManager::find_scripts(&input_dir, &self.options.revision_suffix)?;

        if scripts.is_empty() {
            return Err(anyhow!("No plot scripts found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(scripts.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        folder_pb.set_style(Self::bar_style("files"));
        folder_pb.set_message("Processing files");

        let mut summary = RunSummary::default();

        for script in &scripts {
            let file_name = script
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let outcome = self.run_file(script, &multi_progress, force_overwrite).await;
            if let FileOutcome::Failed(message) = &outcome {
                error!("Error processing file {}: {}", file_name, message);
            }
            summary.record(&outcome);

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");

        let summary_message = format!(
            "Folder processing completed: {} processed, {} skipped, {} errors, {} warnings",
            summary.processed(),
            summary.skipped,
            summary.failed,
            summary.warnings
        );
        info!("{}", summary_message);

        let stats = self.cache.stats();
        if stats.hits > 0 {
            debug!("Translation cache: {} hits, {} misses", stats.hits, stats.misses);
        }

        let log_file_path = self.issues_log_dir(&input_dir).join(ISSUES_LOG_FILE);
        let entry = format!(
            "Folder {}: {} - Duration: {}",
            input_dir.display(),
            summary_message,
            Self::format_duration(start_time.elapsed())
        );
        if let Err(e) = FileManager::append_to_log_file(&log_file_path, &entry) {
            warn!("Failed to write folder logs to file: {}", e);
        }

        Ok(summary)
    }

    /// Drive one pipeline run, rendering its events on a spinner
    async fn run_file(&self, input_file: &Path, multi_progress: &MultiProgress, force_overwrite: bool) -> FileOutcome {
        let run = self.pipeline.start(input_file, self.options.clone());
        let destination = run.destination();

        if destination.exists() && !force_overwrite {
            warn!(
                "Skipping {}, revision already exists (use -f to force overwrite)",
                input_file.display()
            );
            return FileOutcome::Skipped(destination);
        }

        let spinner = if self.show_progress {
            multi_progress.add(ProgressBar::new_spinner())
        } else {
            ProgressBar::hidden()
        };
        spinner.set_style(Self::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(120));

        let mut events = run.into_stream();
        let mut warnings = Vec::new();
        let mut outcome = FileOutcome::Failed("Pipeline ended without a terminal event".to_string());

        while let Some(event) = events.next().await {
            spinner.set_message(event.to_string());
            match event.kind {
                EventKind::Info => {}
                EventKind::Warning => warnings.push(event),
                EventKind::Completed => {
                    outcome = FileOutcome::Written(PathBuf::from(&event.message), warnings.len());
                    spinner.finish_and_clear();
                    println!("{}", event);
                }
                EventKind::Failed => {
                    outcome = FileOutcome::Failed(event.message.clone());
                    spinner.finish_and_clear();
                    println!("{}", event);
                }
            }
        }

        if !warnings.is_empty() {
            self.write_issues(input_file, &destination, &warnings);
        }

        outcome
    }

    /// Append the run's warnings to the issues log next to the output
    fn write_issues(&self, input_file: &Path, destination: &Path, warnings: &[ProgressEvent]) {
        let dir = destination.parent().map(Path::to_path_buf).unwrap_or_default();
        let log_file_path = self.issues_log_dir(&dir).join(ISSUES_LOG_FILE);

        for event in warnings {
            let entry = format!("{}: {}", input_file.display(), event);
            if let Err(e) = FileManager::append_to_log_file(&log_file_path, &entry) {
                warn!("Failed to write logs to file: {}", e);
                return;
            }
        }
        info!("{} warning(s) written to {}", warnings.len(), log_file_path.display());
    }

    fn issues_log_dir(&self, fallback: &Path) -> PathBuf {
        self.options
            .output_dir
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }

    fn bar_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
