//! Generator error types.

use std::path::PathBuf;

use sfgen_core::CoreError;

/// Errors that abort a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A declaration appeared in the region of a module that is not part of
    /// the module graph.
    #[error("{kind} `{name}` belongs to unknown module `{module}` (not in the module graph)")]
    UnknownModule {
        module: String,
        kind: &'static str,
        name: String,
    },

    /// A declaration appeared before the first module marker.
    #[error("{kind} `{name}` appears before any module marker")]
    DeclarationOutsideModule { kind: &'static str, name: String },

    /// The configured module graph is inconsistent.
    #[error("invalid module graph: {detail}")]
    ModuleGraph { detail: String },

    /// A single declaration was skipped. The driver reports these and continues.
    #[error("skipped: {0}")]
    Skip(#[from] SkipReason),

    /// Failed to write an output file.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a declaration produced no output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("{0}")]
    Naming(#[from] CoreError),

    #[error("`{function}` uses wide-character strings")]
    WideCharacter { function: String },

    #[error("`{function}` takes a function-typed parameter `{param}`")]
    FunctionTypedParameter { function: String, param: String },
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, GenError>;
