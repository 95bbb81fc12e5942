//! The declaration model.
//!
//! A flattened header is read into an ordered stream of [`Declaration`]s. The
//! set of variants is closed: every handler matches over it exhaustively
//! instead of probing a generic syntax tree for attributes.

use serde::{Deserialize, Serialize};

/// One top-level declaration from the flattened header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Enum(EnumDecl),
    Struct(RecordDecl),
    Union(RecordDecl),
    OpaqueHandle(OpaqueHandleDecl),
    Function(FunctionDecl),
    FunctionPointer(FunctionPointerTypedef),
}

impl Declaration {
    /// The declared C name, if the declaration has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Declaration::Enum(e) => e.name.as_deref(),
            Declaration::Struct(r) | Declaration::Union(r) => Some(&r.name),
            Declaration::OpaqueHandle(h) => Some(&h.name),
            Declaration::Function(f) => Some(&f.name),
            Declaration::FunctionPointer(f) => Some(&f.name),
        }
    }

    /// Short kind label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::Enum(_) => "enum",
            Declaration::Struct(_) => "struct",
            Declaration::Union(_) => "union",
            Declaration::OpaqueHandle(_) => "opaque handle",
            Declaration::Function(_) => "function",
            Declaration::FunctionPointer(_) => "function pointer",
        }
    }
}

/// An enumeration. `name = None` is a loose group of constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: Option<String>,
    pub members: Vec<EnumMember>,
}

impl EnumDecl {
    /// Whether every member carries an explicit integer value.
    pub fn all_values_explicit(&self) -> bool {
        !self.members.is_empty()
            && self
                .members
                .iter()
                .all(|m| matches!(m.value, Some(EnumValue::Int(_))))
    }
}

/// A single enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<EnumValue>,
}

/// An enumerator initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumValue {
    /// A resolved integer literal.
    Int(i64),
    /// Anything else, kept verbatim (usually another enumerator's name).
    Expr(String),
}

/// A struct or union with a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Type spelling, e.g. `const sfTexture*` or `float[9]`.
    pub ty: String,
    pub name: String,
}

/// A struct declared without a body: a native resource behind a pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaqueHandleDecl {
    pub name: String,
}

/// A function prototype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub return_type: String,
    pub name: String,
    pub params: Vec<Param>,
}

/// A function parameter. Anonymous parameters have no name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: Option<&str>) -> Self {
        Param {
            ty: ty.into(),
            name: name.map(str::to_string),
        }
    }
}

/// `typedef R (*NAME)(params)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionPointerTypedef {
    pub return_type: String,
    pub name: String,
    pub param_types: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_require_every_member() {
        let mut decl = EnumDecl {
            name: Some("sfStatus".into()),
            members: vec![
                EnumMember { name: "sfOk".into(), value: Some(EnumValue::Int(0)) },
                EnumMember { name: "sfFail".into(), value: None },
            ],
        };
        assert!(!decl.all_values_explicit());
        decl.members[1].value = Some(EnumValue::Int(1));
        assert!(decl.all_values_explicit());
        decl.members[1].value = Some(EnumValue::Expr("sfOk".into()));
        assert!(!decl.all_values_explicit());
    }

    #[test]
    fn empty_enum_is_not_explicit() {
        let decl = EnumDecl { name: None, members: vec![] };
        assert!(!decl.all_values_explicit());
    }

    #[test]
    fn declaration_names_and_kinds() {
        let d = Declaration::OpaqueHandle(OpaqueHandleDecl { name: "sfClock".into() });
        assert_eq!(d.name(), Some("sfClock"));
        assert_eq!(d.kind(), "opaque handle");

        let d = Declaration::Enum(EnumDecl { name: None, members: vec![] });
        assert_eq!(d.name(), None);
    }
}
