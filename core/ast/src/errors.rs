//! Error types for the AST crate.
//!
//! This module defines structured errors for reading and parsing source files.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while turning source text into a document.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum AstError {
    /// The source text is outside the supported grammar.
    #[error("{}:{line}:{column}: syntax error: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The C# grammar could not be loaded or the parser gave up.
    #[error("failed to parse {}", path.display())]
    ParseError { path: PathBuf },

    /// Failed to read a source file.
    #[error("failed to read {}: {source}", path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Position-only error produced by the builder; the document layer
/// attaches the path and line/column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub offset: usize,
    pub message: String,
}

impl SyntaxError {
    pub(crate) fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}
