/*!
 * Run orchestration.
 *
 * - `options`: what one run should do
 * - `events`: progress stream vocabulary, including the `SUCCESS:` token
 * - `instructions`: instruction list for the holistic rewrite
 * - `orchestrator`: the `Pipeline` / `PipelineRun` state machine
 */

pub mod events;
pub mod instructions;
pub mod options;
pub mod orchestrator;

pub use events::{EventKind, PipelineStage, ProgressEvent, SUCCESS_TOKEN};
pub use instructions::build_instructions;
pub use options::RunOptions;
pub use orchestrator::{Pipeline, PipelineResult, PipelineRun};
