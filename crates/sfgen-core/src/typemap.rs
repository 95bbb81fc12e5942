//! Type mapping from C spellings to target spellings.
//!
//! Rules, applied in order:
//! 1. strip `const`
//! 2. extract the trailing `[N]` suffix
//! 3. apply the primitive remap table
//! 4. absorb one pointer level for registered opaque handles
//! 5. strip the library prefix
//! 6. capitalize and reattach stars and the array suffix
//!
//! Spellings the mapper cannot decompose pass through unresolved; they will
//! surface as errors in the generated code, not here.

use crate::ctype::CSpelling;
use crate::naming::{capitalize, strip_library_prefix, strip_library_prefix_lenient};
use crate::registry::ClassRegistry;

/// Primitive and library-alias remaps. Targets keep the library prefix where
/// they name another library type so rules 4 and 5 still see it.
const PRIMITIVES: &[(&str, &str)] = &[
    ("void", "Void"),
    ("char", "UInt8"),
    ("signed char", "Int8"),
    ("unsigned char", "UInt8"),
    ("short", "Int16"),
    ("unsigned short", "UInt16"),
    ("int", "Int32"),
    ("unsigned", "Int32"),
    ("unsigned int", "Int32"),
    ("long", "LibC::Long"),
    ("unsigned long", "LibC::ULong"),
    ("long long", "Int64"),
    ("unsigned long long", "UInt64"),
    ("float", "Float32"),
    ("double", "Float64"),
    ("size_t", "LibC::SizeT"),
    ("sfBool", "Int32"),
    ("sfInt8", "Int8"),
    ("sfUint8", "UInt8"),
    ("sfInt16", "Int16"),
    ("sfUint16", "UInt16"),
    ("sfInt32", "Int32"),
    ("sfUint32", "UInt32"),
    ("sfInt64", "Int64"),
    ("sfUint64", "UInt64"),
    ("sfVector2u", "sfVector2i"),
];

/// Look up the remap for a C base spelling.
pub fn remap_primitive(base: &str) -> Option<&'static str> {
    PRIMITIVES
        .iter()
        .find(|(from, _)| *from == base)
        .map(|(_, to)| *to)
}

/// Whether a library type is only an alias of another one (and so is never
/// emitted in its own right).
pub fn is_aliased_record(name: &str) -> bool {
    remap_primitive(name).is_some_and(|to| to != name && to.starts_with(crate::LIBRARY_PREFIX))
}

/// A mapped target type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    /// Base name, e.g. `Float32`, `RenderWindow`, `LibC::SizeT`.
    pub base: String,
    pub pointers: usize,
    pub array: Option<usize>,
}

impl MappedType {
    pub fn plain(base: impl Into<String>) -> Self {
        MappedType {
            base: base.into(),
            pointers: 0,
            array: None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.pointers > 0
    }

    /// Whether this is exactly `base` with no stars and no array suffix.
    pub fn is(&self, base: &str) -> bool {
        self.pointers == 0 && self.array.is_none() && self.base == base
    }

    /// The type one pointer level down.
    pub fn pointee(&self) -> MappedType {
        MappedType {
            base: self.base.clone(),
            pointers: self.pointers.saturating_sub(1),
            array: self.array,
        }
    }

    pub fn is_void(&self) -> bool {
        self.is("Void")
    }
}

impl std::fmt::Display for MappedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.base, "*".repeat(self.pointers))?;
        if let Some(n) = self.array {
            write!(f, "[{n}]")?;
        }
        Ok(())
    }
}

/// Maps C spellings against the classes registered so far.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    classes: &'a ClassRegistry,
}

impl<'a> TypeMapper<'a> {
    pub fn new(classes: &'a ClassRegistry) -> Self {
        TypeMapper { classes }
    }

    /// Map a spelling. `var` is the field or parameter name, used for the
    /// name-conditioned special cases.
    pub fn map(&self, spelling: &str, var: Option<&str>) -> MappedType {
        let parsed = match CSpelling::parse(spelling) {
            Ok(parsed) => parsed,
            Err(_) => return MappedType::plain(spelling.trim()),
        };

        let base: &str = match remap_primitive(&parsed.base) {
            Some(remapped) => remapped,
            None => &parsed.base,
        };
        let mut pointers = parsed.pointers;
        if pointers > 0 {
            if let Ok(stripped) = strip_library_prefix(base) {
                if self.classes.contains(stripped) {
                    pointers -= 1;
                }
            }
        }

        let mut base = capitalize(strip_library_prefix_lenient(base));
        if base == "UInt32" && pointers == 0 && var == Some("unicode") {
            base = "Char".to_string();
        }

        MappedType {
            base,
            pointers,
            array: parsed.array,
        }
    }

    /// Map a spelling straight to its textual form.
    pub fn map_spelling(&self, spelling: &str, var: Option<&str>) -> String {
        self.map(spelling, var).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> ClassRegistry {
        let mut c = ClassRegistry::new();
        c.register("RenderWindow");
        c.register("Texture");
        c
    }

    #[test]
    fn map_primitives() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("char", None), "UInt8");
        assert_eq!(m.map_spelling("int", None), "Int32");
        assert_eq!(m.map_spelling("unsigned int", None), "Int32");
        assert_eq!(m.map_spelling("float", None), "Float32");
        assert_eq!(m.map_spelling("double", None), "Float64");
        assert_eq!(m.map_spelling("sfBool", None), "Int32");
        assert_eq!(m.map_spelling("size_t", None), "LibC::SizeT");
        assert_eq!(m.map_spelling("void", None), "Void");
    }

    #[test]
    fn map_library_fixed_width_aliases() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("sfUint8", None), "UInt8");
        assert_eq!(m.map_spelling("sfInt64", None), "Int64");
        assert_eq!(m.map_spelling("sfUint32", None), "UInt32");
        // Not a fixed-width alias despite the `Int` in its name.
        assert_eq!(m.map_spelling("sfIntRect", None), "IntRect");
    }

    #[test]
    fn map_strips_const_and_keeps_pointers() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("const char*", None), "UInt8*");
        assert_eq!(m.map_spelling("const sfVector2f*", None), "Vector2f*");
        assert_eq!(m.map_spelling("void*", None), "Void*");
    }

    #[test]
    fn map_vector2u_to_signed() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("sfVector2u", None), "Vector2i");
        assert!(is_aliased_record("sfVector2u"));
        assert!(!is_aliased_record("sfVector2f"));
        assert!(!is_aliased_record("sfBool"));
    }

    #[test]
    fn registered_class_absorbs_one_pointer() {
        let c = classes();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("sfRenderWindow*", None), "RenderWindow");
        assert_eq!(m.map_spelling("const sfTexture*", None), "Texture");
        assert_eq!(m.map_spelling("sfTexture**", None), "Texture*");
        // Unregistered types keep their stars.
        assert_eq!(m.map_spelling("sfSprite*", None), "Sprite*");
    }

    #[test]
    fn class_by_value_is_untouched() {
        let c = classes();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("sfTexture", None), "Texture");
    }

    #[test]
    fn array_suffix_reattached() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        let t = m.map("float[9]", Some("matrix"));
        assert_eq!(t.base, "Float32");
        assert_eq!(t.array, Some(9));
        assert_eq!(t.to_string(), "Float32[9]");
    }

    #[test]
    fn unicode_field_maps_to_char() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("sfUint32", Some("unicode")), "Char");
        assert_eq!(m.map_spelling("sfUint32", Some("code")), "UInt32");
        assert_eq!(m.map_spelling("sfUint32*", Some("unicode")), "UInt32*");
    }

    #[test]
    fn unknown_spelling_passes_through() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        assert_eq!(m.map_spelling("MYSTERY_T", None), "MYSTERY_T");
        assert_eq!(m.map_spelling("void (*)(void*)", None), "void (*)(void*)");
    }

    #[test]
    fn pointee_drops_one_level() {
        let c = ClassRegistry::new();
        let m = TypeMapper::new(&c);
        let t = m.map("const sfVertex*", None);
        assert!(t.is_pointer());
        assert!(t.pointee().is("Vertex"));
    }
}
