/*!
 * Error types for the academicplot application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Only `PipelineError`
 * ends a run; every other error is recovered locally by the orchestrator.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete within the configured timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Classify a reqwest transport error
    pub fn from_reqwest(error: reqwest::Error, timeout_secs: u64) -> Self {
        if error.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if error.is_connect() {
            Self::ConnectionError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }

    /// Build an error from a non-success HTTP status
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by the translation gateway
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The service answered with something that is not a JSON object of strings
    #[error("Malformed translation response: {0}")]
    MalformedResponse(String),

    /// The service answered with an empty mapping
    #[error("Translation response contained no translations")]
    EmptyResponse,
}

/// Errors raised by the holistic rewriter
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// None of the active options produced an instruction
    #[error("No rewrite instructions were requested")]
    NotRequested,

    /// The returned text does not look like source code
    #[error("Rewritten document rejected, it does not look like code: {preview}")]
    Rejected {
        /// Leading characters of the rejected answer
        preview: String,
    },
}

/// Errors raised while parsing a source document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The document is not valid source
    #[error("Syntax error at line {line}, column {column}")]
    Syntax {
        /// 1-based line of the first error node
        line: usize,
        /// 1-based column of the first error node
        column: usize,
    },

    /// The grammar could not be loaded into the parser
    #[error("Failed to initialise parser: {0}")]
    ParserInit(String),
}

/// Unrecoverable pipeline errors; these are the only ones that fail a run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Unreadable input or unwritable output
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid source
    #[error("Source could not be parsed: {0}")]
    Parse(#[from] ParseError),
}

impl PipelineError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
