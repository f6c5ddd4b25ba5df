//! Error types for the analyzer crate.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a fix computation. "No fix applies" is not an error; it is `Ok(None)`.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[must_use = "errors must not be silently ignored"]
pub enum FixError {
    #[error("fix computation was cancelled")]
    Cancelled,
}

/// Errors loading an analyzer configuration file.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum ConfigError {
    #[error("failed to read configuration {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid ignored-file pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}
