//! Source reader error types.

use std::path::PathBuf;

/// Errors that can occur while reading the declaration source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// A statement could not be classified as any known declaration shape.
    #[error("line {line}: unparseable statement: {detail}")]
    Unparseable { line: usize, detail: String },

    /// A variadic prototype. These have no binding and are skipped.
    #[error("line {line}: variadic function `{name}` is not supported")]
    Variadic { line: usize, name: String },

    /// Failed to read an input file.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for source reader operations.
pub type Result<T> = std::result::Result<T, SourceError>;
