//! CLI error types

use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] metamorph_core::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{rejected} of {total} classes rejected")]
    Rejected { rejected: usize, total: usize },

    #[error("Demo failed: {0}")]
    Demo(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
