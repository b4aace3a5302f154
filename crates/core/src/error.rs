//! Error types for the LingoBridge domain.
//!
//! One `thiserror` enum per bounded context. Generation errors surface as the
//! apology text; translation and mode errors are recovered where they occur.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {message} (status: {status_code})")]
    ServiceError { status_code: u16, message: String },

    #[error("Generation service out of resources: {0}")]
    ResourceExhausted(String),

    #[error("Generation service returned no usable text")]
    EmptyOutput,

    #[error("Generation service not configured: {0}")]
    NotConfigured(String),

    #[error("Generation timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum TranslationError {
    #[error("Translation request failed: {message} (status: {status_code})")]
    ServiceError { status_code: u16, message: String },

    #[error("Translation service returned an empty result")]
    EmptyResult,

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Language could not be detected")]
    Undetectable,

    #[error("Translation timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum ModeError {
    #[error("Invalid mode '{mode}': {reason}")]
    Invalid { mode: String, reason: String },

    #[error("Default mode '{0}' is not registered")]
    MissingDefault(String),
}
