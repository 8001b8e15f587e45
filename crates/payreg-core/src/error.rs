//! Error types for the payreg-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the payreg library.
#[derive(Error, Debug)]
pub enum PayregError {
    /// Invoice analysis error.
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The image could not be opened or decoded.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Errors raised while extracting and validating invoice data.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No API key was configured for the language model service.
    #[error("missing API key: set llm.api_key or the {0} environment variable")]
    MissingApiKey(&'static str),

    /// The HTTP request to the language model failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("service error ({status}): {message}")]
    Service { status: u16, message: String },

    /// The service answered without any usable candidate.
    #[error("empty response from model")]
    EmptyResponse,

    /// The structured response could not be parsed.
    #[error("failed to parse model response: {0}")]
    Parse(String),
}

/// Errors raised by the form submission adapter.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The form document does not exist.
    #[error("form not found: {}", .0.display())]
    FormNotFound(PathBuf),

    /// The form path could not be turned into a `file://` URL.
    #[error("invalid form location: {0}")]
    InvalidLocation(String),

    /// No browser session could be opened.
    #[error("failed to open browser session: {0}")]
    Session(String),

    /// A browser command (navigate, find, type, click) failed.
    #[error("browser command failed: {0}")]
    Command(String),
}

impl From<fantoccini::error::NewSessionError> for SubmissionError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        Self::Session(e.to_string())
    }
}

impl From<fantoccini::error::CmdError> for SubmissionError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        Self::Command(e.to_string())
    }
}

/// Result type for the payreg library.
pub type Result<T> = std::result::Result<T, PayregError>;
