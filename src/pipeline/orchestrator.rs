/*!
 * Pipeline orchestrator.
 *
 * A `PipelineRun` is a one-shot state machine:
 *
 * ```text
 * Read → Parse → Extract → Translate? → Merge → InjectFontSupport
 *      → StyleOrFallback → SaveDirective? → Write → Done
 * ```
 *
 * `Failed` is reachable from Read, Parse and Write only. Every other failure
 * (translation, rewrite, missing anchors) is turned into a warning event and
 * the run continues on a degraded path. Events are produced lazily: a stage
 * runs only when the caller asks for the next event, so dropping the run (or
 * its stream) between events also drops any in-flight service request.
 */

use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, error, info, warn};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::services::{HolisticRewriter, ServiceSet, TranslationGateway, validate_rewrite};
use crate::source::{
    FontSupportInjector, InjectionOutcome, PlotRules, PresetTable, SaveDirectiveInjector, SourceDocument,
    StructuralExtractor, StyleComposer, TextMerger, TranslationMap,
};

use super::events::{EventKind, PipelineStage, ProgressEvent};
use super::instructions::build_instructions;
use super::options::RunOptions;

/// Shared, read-only pieces every run needs
#[derive(Clone)]
pub struct Pipeline {
    rules: Arc<PlotRules>,
    presets: Arc<PresetTable>,
    translator: Option<Arc<dyn TranslationGateway>>,
    rewriter: Option<Arc<dyn HolisticRewriter>>,
}

impl Pipeline {
    /// A pipeline without external services
    pub fn new(rules: Arc<PlotRules>, presets: Arc<PresetTable>) -> Self {
        Self {
            rules,
            presets,
            translator: None,
            rewriter: None,
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn TranslationGateway>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_rewriter(mut self, rewriter: Arc<dyn HolisticRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn with_services(self, services: ServiceSet) -> Self {
        self.with_translator(services.translator)
            .with_rewriter(services.rewriter)
    }

    pub fn presets(&self) -> &PresetTable {
        &self.presets
    }

    /// Prepare a run; nothing happens until events are pulled
    pub fn start(&self, input: impl Into<PathBuf>, options: RunOptions) -> PipelineRun {
        PipelineRun {
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            input: input.into(),
            options,
            rules: Arc::clone(&self.rules),
            presets: Arc::clone(&self.presets),
            translator: self.translator.clone(),
            rewriter: self.rewriter.clone(),
            next_stage: Some(PipelineStage::Read),
            text: String::new(),
            document: None,
            candidates: TranslationMap::new(),
            translations: None,
            restyled: false,
            output_path: None,
            pending: VecDeque::new(),
            history: Vec::new(),
        }
    }
}

/// Final value of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    /// Text after the last stage that ran
    pub text: String,
    /// Written file; `None` when the run failed
    pub output_path: Option<PathBuf>,
    /// Every event, in order
    pub events: Vec<ProgressEvent>,
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        self.events
            .last()
            .is_some_and(|event| event.kind == EventKind::Completed)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ProgressEvent> {
        self.events.iter().filter(|event| event.is_warning())
    }
}

/// One in-progress run over a single document
pub struct PipelineRun {
    id: String,
    input: PathBuf,
    options: RunOptions,
    rules: Arc<PlotRules>,
    presets: Arc<PresetTable>,
    translator: Option<Arc<dyn TranslationGateway>>,
    rewriter: Option<Arc<dyn HolisticRewriter>>,

    next_stage: Option<PipelineStage>,
    text: String,
    document: Option<SourceDocument>,
    candidates: TranslationMap,
    translations: Option<TranslationMap>,
    /// The holistic rewrite was accepted, so the fallback stages are skipped
    restyled: bool,
    output_path: Option<PathBuf>,

    pending: VecDeque<ProgressEvent>,
    history: Vec<ProgressEvent>,
}

impl PipelineRun {
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Where the revised script will be written
    pub fn destination(&self) -> PathBuf {
        FileManager::revision_output_path(
            &self.input,
            self.options.output_dir.as_deref(),
            &self.options.revision_suffix,
        )
    }

    /// Advance until the next event is available; `None` once the run ended
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                self.history.push(event.clone());
                return Some(event);
            }

            let stage = self.next_stage.take()?;
            debug!("[{}] stage {}", self.id, stage);
            self.next_stage = self.run_stage(stage).await;
        }
    }

    /// Consume the run as a stream of events
    pub fn into_stream(self) -> BoxStream<'static, ProgressEvent> {
        stream::unfold(self, |mut run| async move {
            let event = run.next_event().await?;
            Some((event, run))
        })
        .boxed()
    }

    /// Drive the run to its end and collect the result
    pub async fn finish(mut self) -> PipelineResult {
        while self.next_event().await.is_some() {}

        PipelineResult {
            text: self.text,
            output_path: self.output_path,
            events: self.history,
        }
    }

    fn emit(&mut self, event: ProgressEvent) {
        match event.kind {
            EventKind::Warning => warn!("[{}] {}", self.id, event.message),
            EventKind::Failed => error!("[{}] {}", self.id, event.message),
            _ => debug!("[{}] {}", self.id, event),
        }
        self.pending.push_back(event);
    }

    fn info(&mut self, stage: PipelineStage, message: impl Into<String>) {
        self.emit(ProgressEvent::info(stage, message));
    }

    fn warning(&mut self, stage: PipelineStage, message: impl Into<String>) {
        self.emit(ProgressEvent::warning(stage, message));
    }

    fn fail(&mut self, stage: PipelineStage, err: PipelineError) -> Option<PipelineStage> {
        self.emit(ProgressEvent::failed(format!("{} failed: {}", stage, err)));
        None
    }

    async fn run_stage(&mut self, stage: PipelineStage) -> Option<PipelineStage> {
        match stage {
            PipelineStage::Read => self.read().await,
            PipelineStage::Parse => self.parse(),
            PipelineStage::Extract => self.extract(),
            PipelineStage::Translate => self.translate().await,
            PipelineStage::Merge => self.merge(),
            PipelineStage::InjectFontSupport => self.inject_font_support(),
            PipelineStage::StyleOrFallback => self.style_or_fallback().await,
            PipelineStage::SaveDirective => self.save_directive(),
            PipelineStage::Write => self.write(),
            PipelineStage::Done => self.done(),
            PipelineStage::Failed => None,
        }
    }

    async fn read(&mut self) -> Option<PipelineStage> {
        match tokio::fs::read_to_string(&self.input).await {
            Ok(text) => {
                self.info(
                    PipelineStage::Read,
                    format!("Read {} ({} lines)", self.input.display(), text.lines().count()),
                );
                self.text = text;
                Some(PipelineStage::Parse)
            }
            Err(err) => {
                let err = PipelineError::io(&self.input, err);
                self.fail(PipelineStage::Read, err)
            }
        }
    }

    fn parse(&mut self) -> Option<PipelineStage> {
        match SourceDocument::parse(self.text.as_str()) {
            Ok(document) => {
                self.document = Some(document);
                self.info(PipelineStage::Parse, "Script parsed");
                Some(PipelineStage::Extract)
            }
            Err(err) => self.fail(PipelineStage::Parse, err.into()),
        }
    }

    fn extract(&mut self) -> Option<PipelineStage> {
        if let Some(document) = self.document.take() {
            self.candidates = StructuralExtractor::new(&self.rules).extract(&document);
        }

        self.info(
            PipelineStage::Extract,
            format!("Found {} translatable texts", self.candidates.len()),
        );
        Some(PipelineStage::Translate)
    }

    async fn translate(&mut self) -> Option<PipelineStage> {
        let stage = PipelineStage::Translate;

        if !self.options.translate {
            self.info(stage, "Translation disabled");
            return Some(PipelineStage::InjectFontSupport);
        }
        if self.candidates.is_empty() {
            self.info(stage, "Nothing to translate");
            return Some(PipelineStage::InjectFontSupport);
        }
        let Some(translator) = self.translator.clone() else {
            self.warning(stage, "No translation service configured, keeping original text");
            return Some(PipelineStage::InjectFontSupport);
        };

        self.info(stage, format!("Translating {} texts", self.candidates.len()));
        match translator.translate(&self.candidates).await {
            Ok(translations) => {
                let applied = translations
                    .keys()
                    .filter(|key| self.candidates.contains_key(*key))
                    .count();
                self.info(
                    stage,
                    format!("Received {} of {} translations", applied, self.candidates.len()),
                );
                self.translations = Some(translations);
                Some(PipelineStage::Merge)
            }
            Err(err) => {
                self.warning(stage, format!("Translation failed, keeping original text: {}", err));
                Some(PipelineStage::InjectFontSupport)
            }
        }
    }

    fn merge(&mut self) -> Option<PipelineStage> {
        if let Some(translations) = self.translations.take() {
            self.text = TextMerger::apply(&self.text, &self.candidates, &translations);
        }
        self.info(PipelineStage::Merge, "Translations merged");
        Some(PipelineStage::InjectFontSupport)
    }

    fn inject_font_support(&mut self) -> Option<PipelineStage> {
        let stage = PipelineStage::InjectFontSupport;
        let injection = FontSupportInjector::new(&self.rules).inject(&self.text);

        match injection.outcome {
            InjectionOutcome::Inserted(anchor) => {
                self.info(stage, format!("Font support added after line {}", anchor.line + 1));
            }
            InjectionOutcome::AlreadyPresent => self.info(stage, "Font support already configured"),
            InjectionOutcome::AnchorMissing(kind) => self.warning(
                stage,
                format!("No {} found for {}, font support not added", kind, self.rules.library),
            ),
        }

        self.text = injection.text;
        Some(PipelineStage::StyleOrFallback)
    }

    async fn style_or_fallback(&mut self) -> Option<PipelineStage> {
        let stage = PipelineStage::StyleOrFallback;

        if !self.options.wants_restyle() {
            self.info(stage, "No styling requested");
            return Some(PipelineStage::Write);
        }

        if self.try_holistic_rewrite().await {
            self.restyled = true;
            return Some(PipelineStage::Write);
        }

        if let Some(style) = self.options.style.clone() {
            let composer = StyleComposer::new(&self.presets);
            let injection = composer.inject(&self.text, &style, &self.rules);
            match injection.outcome {
                InjectionOutcome::Inserted(_) => {
                    let preset = composer.resolve(&style).preset_name;
                    self.info(stage, format!("{} style block added", preset));
                }
                InjectionOutcome::AnchorMissing(kind) => {
                    self.warning(stage, format!("No {} found, style block not added", kind));
                }
                InjectionOutcome::AlreadyPresent => {}
            }
            self.text = injection.text;
        }

        if self.options.beautify_layout {
            self.warning(stage, "Layout rebalancing needs the rewrite service, layout left unchanged");
        }

        if self.options.vector_format.is_some() {
            Some(PipelineStage::SaveDirective)
        } else {
            Some(PipelineStage::Write)
        }
    }

    /// Returns true when an accepted rewrite replaced the text
    async fn try_holistic_rewrite(&mut self) -> bool {
        let stage = PipelineStage::StyleOrFallback;

        let Some(rewriter) = self.rewriter.clone() else {
            self.info(stage, "No rewrite service configured, using deterministic styling");
            return false;
        };

        let figure_name = self.figure_name().unwrap_or_default();
        let instructions = build_instructions(&self.options, &self.presets, &self.rules, &figure_name);

        self.info(stage, format!("Requesting holistic rewrite ({} instructions)", instructions.len()));
        let outcome = match rewriter.rewrite(&self.text, &instructions).await {
            Ok(answer) => validate_rewrite(&answer, &self.rules),
            Err(err) => Err(err),
        };

        match outcome {
            Ok(rewritten) => {
                self.text = rewritten;
                self.info(stage, "Holistic rewrite applied");
                true
            }
            Err(err) => {
                self.warning(stage, format!("Holistic rewrite unavailable, using deterministic styling: {}", err));
                false
            }
        }
    }

    fn save_directive(&mut self) -> Option<PipelineStage> {
        let stage = PipelineStage::SaveDirective;
        let Some(figure_name) = self.figure_name() else {
            return Some(PipelineStage::Write);
        };

        let dpi = self.options.export_dpi(&self.presets);
        let injection = SaveDirectiveInjector::new(&self.rules).inject(&self.text, &figure_name, dpi);

        match injection.outcome {
            InjectionOutcome::Inserted(anchor) => {
                self.info(stage, format!("Export to {} added before line {}", figure_name, anchor.line + 1));
            }
            InjectionOutcome::AnchorMissing(kind) => {
                self.warning(stage, format!("No {} found, export directive not added", kind));
            }
            InjectionOutcome::AlreadyPresent => {}
        }

        self.text = injection.text;
        Some(PipelineStage::Write)
    }

    fn write(&mut self) -> Option<PipelineStage> {
        let destination = self.destination();

        match FileManager::write_atomic(&destination, &self.text) {
            Ok(()) => {
                info!("[{}] Wrote {}", self.id, destination.display());
                self.info(PipelineStage::Write, format!("Wrote {}", destination.display()));
                self.output_path = Some(destination);
                Some(PipelineStage::Done)
            }
            Err(err) => {
                let err = PipelineError::io(&destination, err);
                self.fail(PipelineStage::Write, err)
            }
        }
    }

    fn done(&mut self) -> Option<PipelineStage> {
        if let Some(path) = &self.output_path {
            let event = ProgressEvent::completed(path.display().to_string());
            self.emit(event);
        }
        None
    }

    fn figure_name(&self) -> Option<String> {
        self.options
            .vector_format
            .map(|format| FileManager::figure_file_name(&self.input, &self.options.figure_suffix, format))
    }

    /// Whether the accepted holistic rewrite replaced the fallback stages
    pub fn was_restyled(&self) -> bool {
        self.restyled
    }
}
