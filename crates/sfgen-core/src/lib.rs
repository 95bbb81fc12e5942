//! Core model for the sfgen binding generator.
//!
//! Everything here is pure: no I/O, no logging, no per-run state beyond the
//! registries the caller owns.
//!
//! ## Modules
//!
//! - [`decl`]: the closed declaration model produced by the source reader
//! - [`ctype`]: C type spelling decomposition (`const`, stars, `[N]`)
//! - [`naming`]: library prefix stripping and identifier case conversion
//! - [`typemap`]: C spelling → target spelling
//! - [`registry`]: per-run class, struct and enum registries

pub mod ctype;
pub mod decl;
pub mod error;
pub mod naming;
pub mod registry;
pub mod typemap;

// Re-export key types for convenience
pub use ctype::CSpelling;
pub use decl::{
    Declaration, EnumDecl, EnumMember, EnumValue, Field, FunctionDecl, FunctionPointerTypedef,
    OpaqueHandleDecl, Param, RecordDecl,
};
pub use error::CoreError;
pub use naming::{CaseRule, LIBRARY_PREFIX};
pub use registry::{ClassRegistry, EnumRegistry, StructFieldIndex};
pub use typemap::{MappedType, TypeMapper};
