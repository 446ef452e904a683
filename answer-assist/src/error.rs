//! Error types for the answer-assist crate
//!
//! Recoverable detection outcomes (no match, surface unavailable, rate limited,
//! empty knowledge base) are values, not errors. The types here cover the
//! collaborators and the ambient plumbing around the core.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for answer-assist
#[derive(Error, Debug)]
pub enum AssistError {
    #[error("Action sink failed: {0}")]
    Action(String),

    #[error("Confirmation step failed: {0}")]
    Confirmation(String),

    #[error("Text store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Detection task is no longer running")]
    DetectionStopped,
}

impl AssistError {
    pub fn action(message: impl Into<String>) -> Self {
        AssistError::Action(message.into())
    }

    pub fn confirmation(message: impl Into<String>) -> Self {
        AssistError::Confirmation(message.into())
    }
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, AssistError>;
