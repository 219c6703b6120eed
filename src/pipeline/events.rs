/*!
 * Progress event vocabulary.
 */

use std::fmt;

/// Prefix of the terminal event that carries the output path
pub const SUCCESS_TOKEN: &str = "SUCCESS:";

/// Pipeline states, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Read,
    Parse,
    Extract,
    Translate,
    Merge,
    InjectFontSupport,
    StyleOrFallback,
    SaveDirective,
    Write,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Parse => "parse",
            Self::Extract => "extract",
            Self::Translate => "translate",
            Self::Merge => "merge",
            Self::InjectFontSupport => "font-support",
            Self::StyleOrFallback => "style",
            Self::SaveDirective => "save-directive",
            Self::Write => "write",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Info,
    /// Something was skipped or degraded; the run continues
    Warning,
    /// Terminal success; the message is the output path
    Completed,
    /// Terminal failure
    Failed,
}

/// One entry of the progress stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub stage: PipelineStage,
    pub kind: EventKind,
    pub message: String,
}

impl ProgressEvent {
    pub fn info(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: EventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind: EventKind::Warning,
            message: message.into(),
        }
    }

    pub fn completed(output_path: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Done,
            kind: EventKind::Completed,
            message: output_path.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            kind: EventKind::Failed,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Completed | EventKind::Failed)
    }

    pub fn is_warning(&self) -> bool {
        self.kind == EventKind::Warning
    }

    /// Output path carried by a `SUCCESS:` token, if this is one
    pub fn success_path(&self) -> Option<&str> {
        (self.kind == EventKind::Completed).then_some(self.message.as_str())
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EventKind::Completed => write!(f, "{}{}", SUCCESS_TOKEN, self.message),
            EventKind::Failed => write!(f, "ERROR: {}", self.message),
            EventKind::Warning => write!(f, "[{}] warning: {}", self.stage, self.message),
            EventKind::Info => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}
