/*!
 * # academicplot - Publication-ready revisions of matplotlib scripts
 *
 * A Rust library that rewrites a plotting script so its figure is ready for
 * a paper: labels are translated, CJK font support is injected, and the
 * figure can be restyled for an academic venue and exported as a vector
 * graphic.
 *
 * ## Features
 *
 * - Syntax-aware extraction of titles, axis labels, legends and text calls
 * - Longest-first merging of translations back into the source text
 * - Idempotent CJK font support injection
 * - Academic style presets (Nature, NeurIPS, CVPR, Science, IEEE)
 * - Holistic LLM rewrite with a deterministic fallback
 * - Vector export directive (PDF, SVG, EPS)
 * - Progress stream ending in a `SUCCESS:<path>` token
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `source`: Source-level transformations:
 *   - `source::extractor`: Structural extraction of translatable literals
 *   - `source::merger`: Text merging
 *   - `source::font`: Font support injection
 *   - `source::style`: Style presets and the style block composer
 *   - `source::savefig`: Vector export directive
 * - `services`: Translation gateway and holistic rewriter backed by LLMs
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::openai`: OpenAI-compatible client (OpenAI, DeepSeek)
 *   - `providers::anthropic`: Anthropic API client
 *   - `providers::mock`: Scriptable provider for tests
 * - `pipeline`: Run options, progress events and the orchestrator
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod pipeline;
pub mod providers;
pub mod services;
pub mod source;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use errors::{ParseError, PipelineError, ProviderError, RewriteError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t};
pub use pipeline::{Pipeline, PipelineResult, ProgressEvent, RunOptions, SUCCESS_TOKEN};
pub use services::{HolisticRewriter, TranslationGateway};
