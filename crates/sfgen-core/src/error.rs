//! Core error types.

/// Errors raised by the naming engine and the spelling parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A name that must carry the library prefix does not.
    #[error("`{name}` does not carry the `{prefix}` library prefix")]
    MissingLibraryPrefix { name: String, prefix: &'static str },

    /// A type spelling could not be decomposed.
    #[error("invalid type spelling `{spelling}`: {detail}")]
    InvalidTypeSpelling { spelling: String, detail: String },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
