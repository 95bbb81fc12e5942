//! Marshalling strategies between high-level values and C parameters.
//!
//! Every C parameter of a bound function is assigned a [`MarshalStrategy`]
//! that decides the parameter's type restriction in the high-level method,
//! any conversion lines run before the call, and the argument expressions
//! passed to the low-level `fun`.

use sfgen_core::ctype::is_function_type;
use sfgen_core::typemap::remap_primitive;
use sfgen_core::{CSpelling, ClassRegistry, EnumRegistry, FunctionDecl, MappedType};

use crate::error::SkipReason;

/// Strategy for marshalling one high-level parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarshalStrategy {
    /// Passed as is, without a type restriction.
    Passthrough,
    /// Passed as is, restricted to a named type (classes, enums).
    Typed { restriction: String },
    /// `Bool` passed as `1`/`0`.
    Bool,
    /// Any `Number`, narrowed with `conversion` (e.g. `to_f32`).
    Number { conversion: &'static str },
    /// Any `Int`, converted to the C integer type `target`.
    Integer { target: String },
    /// Anything indexable with `[0]` and `[1]`, repacked into `target`.
    Vector { target: String, conversion: &'static str },
    /// `String` passed as a NUL-terminated byte string.
    NarrowString,
    /// `String` converted to a NUL-terminated codepoint array.
    UnicodeString,
    /// A (pointer, count) pair collapsed into one sequence of `element`.
    Sequence { element: String, count: String },
    /// A (void pointer, byte size) pair collapsed into `Bytes`.
    Bytes { count: String },
    /// `const` pointer to a value type: nilable, passed by address.
    NullableRef { target: String },
}

/// A C parameter prepared for marshalling.
#[derive(Debug, Clone)]
pub struct CParam {
    /// Identifier used on both sides, already snake-cased.
    pub name: String,
    /// Original C name, if the parameter had one.
    pub raw_name: Option<String>,
    pub spelling: Option<CSpelling>,
    pub mapped: MappedType,
}

impl CParam {
    fn c_base_is(&self, base: &str, pointers: usize) -> bool {
        self.spelling
            .as_ref()
            .is_some_and(|s| s.base == base && s.pointers == pointers && s.array.is_none())
    }

    fn is_const_pointer_to(&self, base: &str) -> bool {
        self.c_base_is(base, 1) && self.spelling.as_ref().is_some_and(|s| s.is_const)
    }

    /// Whether this is a narrow `const char*` string.
    pub fn is_narrow_string(&self) -> bool {
        self.is_const_pointer_to("char")
    }
}

/// One high-level parameter and the C parameters it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub name: String,
    pub strategy: MarshalStrategy,
}

impl ParamBinding {
    /// The parameter as written in the method signature.
    pub fn signature(&self) -> String {
        match self.restriction() {
            Some(restriction) => format!("{} : {restriction}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn restriction(&self) -> Option<String> {
        match &self.strategy {
            MarshalStrategy::Passthrough | MarshalStrategy::Vector { .. } => None,
            MarshalStrategy::Typed { restriction } => Some(restriction.clone()),
            MarshalStrategy::Bool => Some("Bool".into()),
            MarshalStrategy::Number { .. } => Some("Number".into()),
            MarshalStrategy::Integer { .. } => Some("Int".into()),
            MarshalStrategy::NarrowString | MarshalStrategy::UnicodeString => Some("String".into()),
            MarshalStrategy::Sequence { element, .. } => {
                Some(format!("Array({element}) | Slice({element})"))
            }
            MarshalStrategy::Bytes { .. } => Some("Bytes".into()),
            MarshalStrategy::NullableRef { target } => Some(format!("{target}?")),
        }
    }

    /// Lines run before the call.
    pub fn prelude(&self, lib_name: &str) -> Vec<String> {
        let n = &self.name;
        match &self.strategy {
            MarshalStrategy::UnicodeString => {
                vec![format!("c{n} = {n}.chars.map(&.ord.to_u32) << 0_u32")]
            }
            MarshalStrategy::NullableRef { target } => vec![
                format!("if {n}"),
                format!("  c{n} = {n}"),
                format!("  p{n} = pointerof(c{n})"),
                "else".to_string(),
                format!("  p{n} = Pointer({lib_name}::{target}).null"),
                "end".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    /// Argument expressions, one per covered C parameter.
    pub fn arguments(&self, lib_name: &str) -> Vec<String> {
        let n = &self.name;
        match &self.strategy {
            MarshalStrategy::Passthrough
            | MarshalStrategy::Typed { .. }
            | MarshalStrategy::NarrowString => vec![n.clone()],
            MarshalStrategy::Bool => vec![format!("({n} ? 1 : 0)")],
            MarshalStrategy::Number { conversion } => vec![format!("{n}.{conversion}")],
            MarshalStrategy::Integer { target } => vec![convert_int(target, n)],
            MarshalStrategy::Vector { target, conversion } => vec![format!(
                "{lib_name}::{target}.new(x: {n}[0].{conversion}, y: {n}[1].{conversion})"
            )],
            MarshalStrategy::UnicodeString => vec![format!("c{n}")],
            MarshalStrategy::Sequence { count, .. } => vec![
                format!("{n}.to_unsafe"),
                convert_int(count, &format!("{n}.size")),
            ],
            MarshalStrategy::Bytes { count } => vec![
                format!("{n}.to_unsafe"),
                convert_int(count, &format!("{n}.bytesize")),
            ],
            MarshalStrategy::NullableRef { .. } => vec![format!("p{n}")],
        }
    }
}

const INTEGER_TYPES: &[&str] = &[
    "Int16",
    "UInt16",
    "Int32",
    "UInt32",
    "Int64",
    "UInt64",
    "LibC::SizeT",
];

/// Convert an `Int` expression to the target integer type.
pub fn convert_int(target: &str, expr: &str) -> String {
    match target {
        "Int16" => format!("{expr}.to_i16"),
        "UInt16" => format!("{expr}.to_u16"),
        "Int32" => format!("{expr}.to_i32"),
        "UInt32" => format!("{expr}.to_u32"),
        "Int64" => format!("{expr}.to_i64"),
        "UInt64" => format!("{expr}.to_u64"),
        other => format!("{other}.new({expr})"),
    }
}

fn is_integer(mapped: &MappedType) -> bool {
    mapped.pointers == 0 && mapped.array.is_none() && INTEGER_TYPES.contains(&mapped.base.as_str())
}

fn is_count_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["count", "size", "length"].iter().any(|hint| lower.contains(hint))
}

/// Registries the planner consults.
pub struct Planner<'a> {
    pub classes: &'a ClassRegistry,
    pub enums: &'a EnumRegistry,
    /// Path of the high-level alias for a registered enum.
    pub enum_alias: fn(&str) -> String,
}

impl Planner<'_> {
    /// Assign strategies to `params`, collapsing (pointer, count) pairs.
    pub fn plan(&self, params: &[CParam]) -> Vec<ParamBinding> {
        let mut bindings = Vec::with_capacity(params.len());
        let mut i = 0;
        while i < params.len() {
            let param = &params[i];
            if let Some(binding) = params.get(i + 1).and_then(|next| self.pair(param, next)) {
                bindings.push(binding);
                i += 2;
                continue;
            }
            bindings.push(ParamBinding {
                name: param.name.clone(),
                strategy: self.single(param),
            });
            i += 1;
        }
        bindings
    }

    fn pair(&self, pointer: &CParam, count: &CParam) -> Option<ParamBinding> {
        let count_name = count.raw_name.as_deref()?;
        if !pointer.mapped.is_pointer() || !is_count_name(count_name) || !is_integer(&count.mapped) {
            return None;
        }
        let element = pointer.mapped.pointee();
        if self.classes.contains(&element.base) {
            return None;
        }
        let strategy = if element.is_void() {
            MarshalStrategy::Bytes {
                count: count.mapped.base.clone(),
            }
        } else {
            MarshalStrategy::Sequence {
                element: element.to_string(),
                count: count.mapped.base.clone(),
            }
        };
        Some(ParamBinding {
            name: pointer.name.clone(),
            strategy,
        })
    }

    fn single(&self, param: &CParam) -> MarshalStrategy {
        let mapped = &param.mapped;
        if param.is_narrow_string() {
            return MarshalStrategy::NarrowString;
        }
        if param.is_const_pointer_to("sfUint32") {
            return MarshalStrategy::UnicodeString;
        }
        if param.c_base_is("sfBool", 0) {
            return MarshalStrategy::Bool;
        }
        if param.c_base_is("float", 0) {
            return MarshalStrategy::Number { conversion: "to_f32" };
        }
        if param.c_base_is("double", 0) {
            return MarshalStrategy::Number { conversion: "to_f64" };
        }
        if is_integer(mapped) {
            return MarshalStrategy::Integer {
                target: mapped.base.clone(),
            };
        }
        if mapped.is("Vector2f") {
            return MarshalStrategy::Vector {
                target: "Vector2f".into(),
                conversion: "to_f32",
            };
        }
        if mapped.is("Vector2i") {
            return MarshalStrategy::Vector {
                target: "Vector2i".into(),
                conversion: "to_i32",
            };
        }
        if mapped.pointers == 0 && self.classes.contains(&mapped.base) {
            return MarshalStrategy::Typed {
                restriction: mapped.base.clone(),
            };
        }
        if let Some(spelling) = &param.spelling {
            let library_value = spelling.base.starts_with(sfgen_core::LIBRARY_PREFIX)
                && remap_primitive(&spelling.base).is_none();
            if spelling.is_const && spelling.pointers == 1 && mapped.pointers == 1 && library_value {
                return MarshalStrategy::NullableRef {
                    target: mapped.pointee().to_string(),
                };
            }
        }
        if mapped.pointers == 0 && self.enums.contains(&mapped.base) {
            return MarshalStrategy::Typed {
                restriction: (self.enum_alias)(&mapped.base),
            };
        }
        MarshalStrategy::Passthrough
    }
}

/// Reject functions that cannot be bound at all.
pub fn check_bindable(function: &FunctionDecl) -> Result<(), SkipReason> {
    let wide = |ty: &str| CSpelling::parse(ty).is_ok_and(|s| s.is_wide_char());
    if wide(&function.return_type) || function.params.iter().any(|p| wide(&p.ty)) {
        return Err(SkipReason::WideCharacter {
            function: function.name.clone(),
        });
    }
    for (i, param) in function.params.iter().enumerate() {
        if is_function_type(&param.ty) {
            return Err(SkipReason::FunctionTypedParameter {
                function: function.name.clone(),
                param: param.name.clone().unwrap_or_else(|| format!("#{i}")),
            });
        }
    }
    Ok(())
}

/// How a return value is converted back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnStrategy {
    Void,
    /// Returned as is.
    Raw,
    /// `!= 0`.
    Bool,
    /// `String.new`.
    NarrowString,
    /// Walked to the NUL codepoint.
    UnicodeString,
    /// Repacked into `Vector2`.
    Vector,
    /// A registered class, wrapped or transferred.
    Class {
        name: String,
        transfer: bool,
        nullable: bool,
    },
}

impl ReturnStrategy {
    /// Classify a return type. `transfer` and `nullable` only matter for
    /// class returns.
    pub fn classify(
        spelling: Option<&CSpelling>,
        mapped: &MappedType,
        classes: &ClassRegistry,
        transfer: bool,
        nullable: bool,
    ) -> Self {
        let c_is = |base: &str, pointers: usize| {
            spelling.is_some_and(|s| s.base == base && s.pointers == pointers)
        };
        if mapped.is_void() {
            ReturnStrategy::Void
        } else if c_is("sfBool", 0) {
            ReturnStrategy::Bool
        } else if c_is("char", 1) {
            ReturnStrategy::NarrowString
        } else if c_is("sfUint32", 1) {
            ReturnStrategy::UnicodeString
        } else if mapped.is("Vector2f") || mapped.is("Vector2i") {
            ReturnStrategy::Vector
        } else if mapped.pointers == 0 && classes.contains(&mapped.base) {
            ReturnStrategy::Class {
                name: mapped.base.clone(),
                transfer,
                nullable,
            }
        } else {
            ReturnStrategy::Raw
        }
    }

    /// Body lines that perform `call` and produce the result. `copy_back`
    /// lines run after the call and before the result expression.
    pub fn render(&self, call: &str, copy_back: &[String]) -> Vec<String> {
        let needs_binding = !copy_back.is_empty()
            || matches!(
                self,
                ReturnStrategy::UnicodeString
                    | ReturnStrategy::Vector
                    | ReturnStrategy::Class { nullable: true, .. }
            );
        if matches!(self, ReturnStrategy::Void) {
            let mut lines = vec![call.to_string()];
            lines.extend_from_slice(copy_back);
            return lines;
        }

        let mut lines = Vec::new();
        let value = if needs_binding {
            lines.push(format!("result = {call}"));
            lines.extend_from_slice(copy_back);
            "result".to_string()
        } else {
            call.to_string()
        };
        match self {
            ReturnStrategy::Void => {}
            ReturnStrategy::Raw => lines.push(value),
            ReturnStrategy::Bool => lines.push(format!("{value} != 0")),
            ReturnStrategy::NarrowString => lines.push(format!("String.new({value})")),
            ReturnStrategy::UnicodeString => lines.extend([
                "String.build do |io|".to_string(),
                format!("  while (c = {value}.value) != 0"),
                "    io << c.chr".to_string(),
                format!("    {value} += 1"),
                "  end".to_string(),
                "end".to_string(),
            ]),
            ReturnStrategy::Vector => lines.push(format!("Vector2.new({value}.x, {value}.y)")),
            ReturnStrategy::Class {
                name,
                transfer,
                nullable,
            } => {
                let ctor = if *transfer { "transfer_ptr" } else { "wrap_ptr" };
                if *nullable {
                    lines.push(format!("{value}.null? ? nil : {name}.{ctor}({value})"));
                } else {
                    lines.push(format!("{name}.{ctor}({value})"));
                }
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfgen_core::{Param, TypeMapper};

    fn no_alias(name: &str) -> String {
        name.to_string()
    }

    fn cparams(classes: &ClassRegistry, params: &[(&str, &str)]) -> Vec<CParam> {
        let mapper = TypeMapper::new(classes);
        params
            .iter()
            .map(|(ty, name)| CParam {
                name: name.to_string(),
                raw_name: Some(name.to_string()),
                spelling: CSpelling::parse(ty).ok(),
                mapped: mapper.map(ty, Some(name)),
            })
            .collect()
    }

    fn plan(classes: &ClassRegistry, enums: &EnumRegistry, params: &[(&str, &str)]) -> Vec<ParamBinding> {
        let planner = Planner {
            classes,
            enums,
            enum_alias: no_alias,
        };
        planner.plan(&cparams(classes, params))
    }

    #[test]
    fn primitive_strategies() {
        let classes = ClassRegistry::new();
        let enums = EnumRegistry::new();
        let b = plan(
            &classes,
            &enums,
            &[("sfBool", "visible"), ("float", "angle"), ("unsigned int", "limit"), ("size_t", "index")],
        );
        assert_eq!(b[0].signature(), "visible : Bool");
        assert_eq!(b[0].arguments("CSFML"), vec!["(visible ? 1 : 0)"]);
        assert_eq!(b[1].signature(), "angle : Number");
        assert_eq!(b[1].arguments("CSFML"), vec!["angle.to_f32"]);
        assert_eq!(b[2].arguments("CSFML"), vec!["limit.to_i32"]);
        assert_eq!(b[3].signature(), "index : Int");
        assert_eq!(b[3].arguments("CSFML"), vec!["LibC::SizeT.new(index)"]);
    }

    #[test]
    fn pointer_count_pair_collapses() {
        let classes = ClassRegistry::new();
        let enums = EnumRegistry::new();
        let b = plan(
            &classes,
            &enums,
            &[("const sfVertex*", "vertices"), ("size_t", "vertexCount")],
        );
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].signature(), "vertices : Array(Vertex) | Slice(Vertex)");
        assert_eq!(
            b[0].arguments("CSFML"),
            vec!["vertices.to_unsafe", "LibC::SizeT.new(vertices.size)"]
        );
    }

    #[test]
    fn void_buffer_collapses_to_bytes() {
        let classes = ClassRegistry::new();
        let enums = EnumRegistry::new();
        let b = plan(&classes, &enums, &[("const void*", "data"), ("size_t", "sizeInBytes")]);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].signature(), "data : Bytes");
        assert_eq!(
            b[0].arguments("CSFML"),
            vec!["data.to_unsafe", "LibC::SizeT.new(data.bytesize)"]
        );
    }

    #[test]
    fn pointer_without_count_is_not_collapsed() {
        let classes = ClassRegistry::new();
        let enums = EnumRegistry::new();
        let b = plan(&classes, &enums, &[("float*", "values"), ("float", "scale")]);
        assert_eq!(b.len(), 2);
        assert_eq!(b[0].strategy, MarshalStrategy::Passthrough);
    }

    #[test]
    fn strings() {
        let classes = ClassRegistry::new();
        let enums = EnumRegistry::new();
        let b = plan(&classes, &enums, &[("const char*", "filename"), ("const sfUint32*", "text")]);
        assert_eq!(b[0].strategy, MarshalStrategy::NarrowString);
        assert_eq!(b[0].arguments("CSFML"), vec!["filename"]);
        assert_eq!(b[1].signature(), "text : String");
        assert_eq!(b[1].prelude("CSFML"), vec!["ctext = text.chars.map(&.ord.to_u32) << 0_u32"]);
        assert_eq!(b[1].arguments("CSFML"), vec!["ctext"]);
    }

    #[test]
    fn vectors_classes_and_nullable_refs() {
        let mut classes = ClassRegistry::new();
        classes.register("Texture");
        let enums = EnumRegistry::new();
        let b = plan(
            &classes,
            &enums,
            &[
                ("sfVector2f", "position"),
                ("const sfTexture*", "texture"),
                ("const sfRenderStates*", "states"),
            ],
        );
        assert_eq!(b[0].signature(), "position");
        assert_eq!(
            b[0].arguments("CSFML"),
            vec!["CSFML::Vector2f.new(x: position[0].to_f32, y: position[1].to_f32)"]
        );
        assert_eq!(b[1].signature(), "texture : Texture");
        assert_eq!(b[2].signature(), "states : RenderStates?");
        assert_eq!(
            b[2].prelude("CSFML"),
            vec![
                "if states",
                "  cstates = states",
                "  pstates = pointerof(cstates)",
                "else",
                "  pstates = Pointer(CSFML::RenderStates).null",
                "end"
            ]
        );
        assert_eq!(b[2].arguments("CSFML"), vec!["pstates"]);
    }

    #[test]
    fn enum_parameters_are_typed() {
        let classes = ClassRegistry::new();
        let mut enums = EnumRegistry::new();
        enums.register("BlendFactor");
        let b = plan(&classes, &enums, &[("sfBlendFactor", "factor"), ("sfColor", "color")]);
        assert_eq!(b[0].signature(), "factor : BlendFactor");
        assert_eq!(b[1].strategy, MarshalStrategy::Passthrough);
    }

    #[test]
    fn reject_wide_and_function_typed() {
        let wide = FunctionDecl {
            return_type: "void".into(),
            name: "sfText_setWideString".into(),
            params: vec![Param::new("const wchar_t*", Some("string"))],
        };
        assert!(matches!(check_bindable(&wide), Err(SkipReason::WideCharacter { .. })));

        let callback = FunctionDecl {
            return_type: "void".into(),
            name: "sfThread_create".into(),
            params: vec![Param::new("void (*)(void*)", Some("function"))],
        };
        assert!(matches!(
            check_bindable(&callback),
            Err(SkipReason::FunctionTypedParameter { .. })
        ));
    }

    #[test]
    fn class_return_transfer_and_wrap() {
        let call = "CSFML.texture_copy(@this)";
        let transfer = ReturnStrategy::Class {
            name: "Texture".into(),
            transfer: true,
            nullable: false,
        };
        assert_eq!(transfer.render(call, &[]), vec!["Texture.transfer_ptr(CSFML.texture_copy(@this))"]);

        let wrap = ReturnStrategy::Class {
            name: "Texture".into(),
            transfer: false,
            nullable: true,
        };
        assert_eq!(
            wrap.render("CSFML.sprite_get_texture(@this)", &[]),
            vec![
                "result = CSFML.sprite_get_texture(@this)",
                "result.null? ? nil : Texture.wrap_ptr(result)"
            ]
        );
    }

    #[test]
    fn bool_and_copy_back() {
        assert_eq!(ReturnStrategy::Bool.render("CSFML.f()", &[]), vec!["CSFML.f() != 0"]);
        let copy_back = vec!["@matrix = cself.matrix".to_string()];
        assert_eq!(
            ReturnStrategy::Void.render("CSFML.g(pointerof(cself))", &copy_back),
            vec!["CSFML.g(pointerof(cself))", "@matrix = cself.matrix"]
        );
        assert_eq!(
            ReturnStrategy::Raw.render("CSFML.h(pointerof(cself))", &copy_back),
            vec!["result = CSFML.h(pointerof(cself))", "@matrix = cself.matrix", "result"]
        );
    }

    fn classify_return(ty: &str) -> ReturnStrategy {
        let classes = ClassRegistry::new();
        let mapper = TypeMapper::new(&classes);
        let spelling = CSpelling::parse(ty).ok();
        ReturnStrategy::classify(spelling.as_ref(), &mapper.map(ty, None), &classes, false, false)
    }

    #[test]
    fn narrow_string_return() {
        let strategy = classify_return("const char*");
        assert_eq!(strategy, ReturnStrategy::NarrowString);
        assert_eq!(
            strategy.render("CSFML.shader_get_name(@this)", &[]),
            vec!["String.new(CSFML.shader_get_name(@this))"]
        );
    }

    #[test]
    fn unicode_string_return_walks_to_terminator() {
        let strategy = classify_return("const sfUint32*");
        assert_eq!(strategy, ReturnStrategy::UnicodeString);
        assert_eq!(
            strategy.render("CSFML.text_get_unicode_string(@this)", &[]),
            vec![
                "result = CSFML.text_get_unicode_string(@this)",
                "String.build do |io|",
                "  while (c = result.value) != 0",
                "    io << c.chr",
                "    result += 1",
                "  end",
                "end",
            ]
        );
    }

    #[test]
    fn vector_return_is_repacked() {
        let strategy = classify_return("sfVector2u");
        assert_eq!(strategy, ReturnStrategy::Vector);
        assert_eq!(
            strategy.render("CSFML.window_get_size(@this)", &[]),
            vec!["result = CSFML.window_get_size(@this)", "Vector2.new(result.x, result.y)"]
        );
        assert_eq!(classify_return("sfVector2f"), ReturnStrategy::Vector);
    }
}
