//! Error types shared by every stage of the pipeline.

use std::path::PathBuf;

/// Errors that can occur while translating, fetching, processing or rendering.
#[derive(Debug, thiserror::Error)]
pub enum FreidokError {
    /// A `--fields` entry is not a known publication field
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A fieldset name is neither built-in nor defined in the environment
    #[error("Unknown fieldset: {name} (available: {available})")]
    UnknownFieldset { name: String, available: String },

    /// Bad year range, malformed parameter string or missing selector
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Response or passthrough file does not match the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Network failure or non-success HTTP status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Output file could not be written
    #[error("Cannot write output to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template could not be loaded, parsed or rendered
    #[error("Template error: {0}")]
    Template(#[from] crate::render::template::TemplateError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file could not be read
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for FreidokError {
    fn from(err: reqwest::Error) -> Self {
        FreidokError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for FreidokError {
    fn from(err: serde_json::Error) -> Self {
        FreidokError::Schema(format!("JSON: {}", err))
    }
}

impl From<config::ConfigError> for FreidokError {
    fn from(err: config::ConfigError) -> Self {
        FreidokError::Config(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FreidokError>;
