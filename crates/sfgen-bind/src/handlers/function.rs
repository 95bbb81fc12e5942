//! Function prototypes and function-pointer typedefs.
//!
//! Every bindable prototype gets a low-level `fun`. The high-level binding is
//! attributed to a class, a value type, a namespace or the module root, named
//! through the rule pipelines in [`crate::rules`] and marshalled through
//! [`crate::marshal`].

use sfgen_core::naming::strip_library_prefix;
use sfgen_core::{CSpelling, FunctionDecl, FunctionPointerTypedef, MappedType, LIBRARY_PREFIX};

use super::{buffers, doc_lines, enums, indented};
use crate::context::{GenerationContext, SectionKind};
use crate::error::{Result, SkipReason};
use crate::marshal::{check_bindable, CParam, ParamBinding, Planner, ReturnStrategy};
use crate::rules::{self, MethodContext, Renamed, RuleContext};

/// Narrow-string names superseded by their unicode variant.
const SUPERSEDED_NAMES: &[&str] = &["string", "str", "title"];

/// Where a function lands in the high-level file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Attribution {
    /// `initialize` of a class.
    Constructor { class: String },
    /// `def self.from_*` of a class.
    AlternateConstructor { class: String },
    /// Method on a class, receiver passed as `@this`.
    Instance { class: String },
    /// Method on a value type, receiver passed through a scratch copy.
    StructInstance { record: String, mutable: bool },
    /// `def self.` on a namespace, plus a deprecated root alias.
    Static { segment: String },
    Root,
}

impl Attribution {
    fn receivers(&self) -> usize {
        match self {
            Attribution::Instance { .. } | Attribution::StructInstance { .. } => 1,
            _ => 0,
        }
    }

    fn is_constructor(&self) -> bool {
        matches!(
            self,
            Attribution::Constructor { .. } | Attribution::AlternateConstructor { .. }
        )
    }

    fn is_static(&self) -> bool {
        matches!(
            self,
            Attribution::AlternateConstructor { .. } | Attribution::Static { .. }
        )
    }
}

/// The synthesized high-level method.
struct Method {
    attribution: Attribution,
    name: String,
    /// Snake-cased renamed C name, used for the deprecated root alias.
    legacy_name: String,
    bindings: Vec<ParamBinding>,
    body: Vec<String>,
}

impl Method {
    fn def_line(&self) -> String {
        let prefix = if self.attribution.is_static() { "self." } else { "" };
        if self.bindings.is_empty() {
            format!("def {prefix}{}", self.name)
        } else {
            let signature: Vec<String> = self.bindings.iter().map(ParamBinding::signature).collect();
            format!("def {prefix}{}({})", self.name, signature.join(", "))
        }
    }

    fn lines(&self, docs: &[String]) -> Vec<String> {
        let mut lines = docs.to_vec();
        lines.push(self.def_line());
        lines.extend(indented(&self.body, 2));
        lines.push("end".to_string());
        lines.push(String::new());
        lines
    }

    /// Root-level forwarder under the unqualified name.
    fn deprecated_alias(&self, segment: &str) -> Vec<String> {
        let names: Vec<&str> = self.bindings.iter().map(|b| b.name.as_str()).collect();
        let forward = match self.name.strip_suffix('=') {
            Some(stem) => format!("{segment}.{stem} = {}", names.join(", ")),
            None if names.is_empty() => format!("{segment}.{}", self.name),
            None => format!("{segment}.{}({})", self.name, names.join(", ")),
        };
        let def = if self.bindings.is_empty() {
            format!("def {}", self.legacy_name)
        } else {
            let signature: Vec<String> = self.bindings.iter().map(ParamBinding::signature).collect();
            format!("def {}({})", self.legacy_name, signature.join(", "))
        };
        vec![
            format!("@[Deprecated(\"Use `{segment}.{}` instead\")]", self.name),
            def,
            format!("  {forward}"),
            "end".to_string(),
            String::new(),
        ]
    }
}

pub(super) fn handle_function(ctx: &mut GenerationContext<'_>, decl: &FunctionDecl) -> Result<()> {
    let doc = ctx.take_doc();
    let stripped = strip_library_prefix(&decl.name)
        .map_err(SkipReason::from)?
        .to_string();
    check_bindable(decl)?;

    let mapper = ctx.mapper();
    let params: Vec<CParam> = decl
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| CParam {
            name: p
                .name
                .as_deref()
                .map_or_else(|| format!("arg{i}"), |name| ctx.case(name)),
            raw_name: p.name.clone(),
            spelling: CSpelling::parse(&p.ty).ok(),
            mapped: mapper.map(&p.ty, p.name.as_deref()),
        })
        .collect();
    let return_spelling = CSpelling::parse(&decl.return_type).ok();
    let returns = mapper.map(&decl.return_type, None);

    let fun_name = ctx.case(&stripped);
    let lib_line = fun_declaration(&fun_name, &decl.name, &params, &returns);
    let docs = doc_lines(doc.as_deref());

    let returns_class = returns.pointers == 0 && ctx.classes.contains(&returns.base);
    let renamed = rules::rename(
        &stripped,
        &RuleContext {
            raw_name: &decl.name,
            returns_class,
        },
    );
    let (attribution, raw_method) = attribute(ctx, decl, &params, &returns, &renamed);
    let method_name = rules::method_name(
        &ctx.case(&raw_method),
        &MethodContext {
            arity: params.len(),
            receivers: attribution.receivers(),
            is_constructor: attribution.is_constructor(),
        },
    )
    .name;

    let returns_narrow_string = return_spelling
        .as_ref()
        .is_some_and(|s| s.base == "char" && s.pointers == 1);
    let superseded = params.iter().any(|p| {
        p.is_narrow_string()
            && p.raw_name.as_deref().is_some_and(|n| SUPERSEDED_NAMES.contains(&n))
    }) || (returns_narrow_string
        && SUPERSEDED_NAMES.contains(&method_name.trim_end_matches(['=', '?'])));

    let method = if superseded {
        tracing::debug!(function = %decl.name, "superseded by its unicode variant");
        None
    } else {
        let transfer = decl.name.contains("_create") || decl.name.contains("_copy");
        let nullable = doc.as_deref().is_some_and(|d| d.contains("NULL"));
        Some(synthesize(
            ctx,
            attribution,
            method_name,
            ctx.case(&renamed.name),
            &fun_name,
            &params,
            ReturnStrategy::classify(
                return_spelling.as_ref(),
                &returns,
                &ctx.classes,
                transfer,
                nullable,
            ),
        ))
    };

    let kind_of = |name: &str| {
        if ctx.classes.contains(name) {
            SectionKind::Class
        } else if ctx.structs.contains(name) {
            SectionKind::Struct
        } else {
            SectionKind::Module
        }
    };
    let segment_kind = match method.as_ref().map(|m| &m.attribution) {
        Some(Attribution::Static { segment }) => kind_of(segment),
        _ => SectionKind::Module,
    };

    let module = buffers(ctx, &decl.name)?;
    module.lib.extend(docs.iter().cloned());
    module.lib.push(lib_line);
    module.lib.push(String::new());

    let Some(method) = method else {
        return Ok(());
    };
    let lines = method.lines(&docs);
    match &method.attribution {
        Attribution::Constructor { class }
        | Attribution::AlternateConstructor { class }
        | Attribution::Instance { class } => {
            module.section(class, SectionKind::Class).body.extend(lines);
        }
        Attribution::StructInstance { record, .. } => {
            module.section(record, SectionKind::Struct).body.extend(lines);
        }
        Attribution::Static { segment } => {
            module.section(segment, segment_kind).body.extend(lines);
            module.root.extend(method.deprecated_alias(segment));
        }
        Attribution::Root => module.root.extend(lines),
    }
    tracing::debug!(
        function = %decl.name,
        method = %method.name,
        attribution = ?method.attribution,
        "emitted function"
    );
    Ok(())
}

/// The low-level `fun` line, with every parameter type mapped.
fn fun_declaration(fun_name: &str, raw_name: &str, params: &[CParam], returns: &MappedType) -> String {
    let mut line = format!("fun {fun_name} = {raw_name}");
    if !params.is_empty() {
        let params: Vec<String> = params
            .iter()
            .map(|p| format!("{} : {}", p.name, p.mapped))
            .collect();
        line.push_str(&format!("({})", params.join(", ")));
    }
    if !returns.is_void() {
        line.push_str(&format!(" : {returns}"));
    }
    line
}

/// Whether `raw_name` is `sf<owner>_...`.
fn named_after(raw_name: &str, owner: &str) -> bool {
    raw_name
        .strip_prefix(LIBRARY_PREFIX)
        .and_then(|rest| rest.strip_prefix(owner))
        .is_some_and(|rest| rest.starts_with('_'))
}

/// Decide where the function goes. Returns the attribution and the
/// method segment of the renamed C name.
fn attribute(
    ctx: &GenerationContext<'_>,
    decl: &FunctionDecl,
    params: &[CParam],
    returns: &MappedType,
    renamed: &Renamed,
) -> (Attribution, String) {
    let method_segment = |owner: &str| {
        renamed
            .name
            .strip_prefix(owner)
            .and_then(|rest| rest.strip_prefix('_'))
            .map(str::to_string)
    };

    if renamed.fired("constructor") || renamed.fired("alternate-constructor") {
        let class = returns.base.clone();
        let method = renamed
            .name
            .split_once('_')
            .map_or_else(|| "initialize".to_string(), |(_, m)| m.to_string());
        return if renamed.fired("constructor") {
            (Attribution::Constructor { class }, method)
        } else {
            (Attribution::AlternateConstructor { class }, method)
        };
    }

    if let Some(first) = params.first() {
        let class = &first.mapped.base;
        if first.mapped.pointers == 0 && ctx.classes.contains(class) && named_after(&decl.name, class) {
            if let Some(method) = method_segment(class) {
                return (
                    Attribution::Instance {
                        class: class.clone(),
                    },
                    method,
                );
            }
        }

        let record = &first.mapped.base;
        if let Some(spelling) = &first.spelling {
            if spelling.pointers == 1
                && first.mapped.pointers == 1
                && ctx.structs.contains(record)
                && named_after(&decl.name, record)
            {
                if let Some(method) = method_segment(record) {
                    return (
                        Attribution::StructInstance {
                            record: record.clone(),
                            mutable: !spelling.is_const,
                        },
                        method,
                    );
                }
            }
        }
    }

    match renamed.name.split_once('_') {
        Some((segment, method)) if !segment.is_empty() && !method.is_empty() => (
            Attribution::Static {
                segment: segment.to_string(),
            },
            method.to_string(),
        ),
        _ => (Attribution::Root, renamed.name.clone()),
    }
}

/// Plan parameters and build the method body.
fn synthesize(
    ctx: &GenerationContext<'_>,
    attribution: Attribution,
    name: String,
    legacy_name: String,
    fun_name: &str,
    params: &[CParam],
    returns: ReturnStrategy,
) -> Method {
    let lib_name = &ctx.options.lib_name;
    let planner = Planner {
        classes: &ctx.classes,
        enums: &ctx.enums,
        enum_alias: enums::alias_path,
    };
    let bindings = planner.plan(&params[attribution.receivers()..]);

    let mut body: Vec<String> = bindings.iter().flat_map(|b| b.prelude(lib_name)).collect();
    let mut args = Vec::new();
    let mut copy_back = Vec::new();
    match &attribution {
        Attribution::Instance { .. } => args.push("@this".to_string()),
        Attribution::StructInstance { record, mutable } => {
            body.push("cself = self".to_string());
            args.push("pointerof(cself)".to_string());
            if *mutable {
                for field in ctx.structs.fields(record).unwrap_or_default() {
                    copy_back.push(format!("@{field} = cself.{field}"));
                }
            }
        }
        _ => {}
    }
    args.extend(bindings.iter().flat_map(|b| b.arguments(lib_name)));
    let call = if args.is_empty() {
        format!("{lib_name}.{fun_name}")
    } else {
        format!("{lib_name}.{fun_name}({})", args.join(", "))
    };

    match &attribution {
        Attribution::Constructor { .. } => {
            body.push(format!("@this = {call}"));
            body.push("@owned = true".to_string());
        }
        Attribution::Instance { .. } if name == "finalize" => {
            body.push(format!("{call} if @owned"));
        }
        _ => body.extend(returns.render(&call, &copy_back)),
    }

    Method {
        attribution,
        name,
        legacy_name,
        bindings,
        body,
    }
}

pub(super) fn handle_function_pointer(
    ctx: &mut GenerationContext<'_>,
    decl: &FunctionPointerTypedef,
) -> Result<()> {
    let doc = ctx.take_doc();
    let name = strip_library_prefix(&decl.name)
        .map_err(SkipReason::from)?
        .to_string();
    let mapper = ctx.mapper();
    let params: Vec<String> = decl
        .param_types
        .iter()
        .map(|ty| mapper.map_spelling(ty, None))
        .collect();
    let returns = mapper.map_spelling(&decl.return_type, None);
    let line = if params.is_empty() {
        format!("alias {name} = -> {returns}")
    } else {
        format!("alias {name} = ({}) -> {returns}", params.join(", "))
    };

    let module = buffers(ctx, &decl.name)?;
    module.lib.extend(doc_lines(doc.as_deref()));
    module.lib.push(line);
    module.lib.push(String::new());
    tracing::debug!(name = %name, "emitted function pointer");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GenError, GeneratorOptions};
    use sfgen_core::{OpaqueHandleDecl, Param, RecordDecl};

    fn function(ret: &str, name: &str, params: &[(&str, Option<&str>)]) -> FunctionDecl {
        FunctionDecl {
            return_type: ret.into(),
            name: name.into(),
            params: params.iter().map(|(ty, n)| Param::new(*ty, *n)).collect(),
        }
    }

    fn context<'o>(options: &'o GeneratorOptions, module: &str, classes: &[&str]) -> GenerationContext<'o> {
        let mut ctx = GenerationContext::new(options).unwrap();
        ctx.enter_module(module);
        for class in classes {
            super::super::class::handle_opaque(
                &mut ctx,
                &OpaqueHandleDecl {
                    name: format!("sf{class}"),
                },
            )
            .unwrap();
        }
        ctx
    }

    fn class_body(ctx: &GenerationContext<'_>, module: &str, class: &str) -> Vec<String> {
        let body = &ctx.modules[module].sections[class].body;
        let start = body.iter().position(|l| l == "def to_unsafe").unwrap() + 4;
        body[start..].to_vec()
    }

    #[test]
    fn constructor_owns_and_destructor_checks_ownership() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "system", &["Clock"]);
        handle_function(&mut ctx, &function("sfClock*", "sfClock_create", &[])).unwrap();
        handle_function(&mut ctx, &function("void", "sfClock_destroy", &[("sfClock*", Some("clock"))]))
            .unwrap();

        assert_eq!(
            class_body(&ctx, "system", "Clock"),
            vec![
                "def initialize",
                "  @this = CSFML.clock_create",
                "  @owned = true",
                "end",
                "",
                "def finalize",
                "  CSFML.clock_destroy(@this) if @owned",
                "end",
                "",
            ]
        );
        let lib = &ctx.modules["system"].lib;
        assert!(lib.contains(&"fun clock_create = sfClock_create : Clock".to_string()));
        assert!(lib.contains(&"fun clock_destroy = sfClock_destroy(clock : Clock)".to_string()));
    }

    #[test]
    fn anonymous_parameters_are_numbered() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "system", &["Foo"]);
        let decl = function("void", "sfFoo_setValue", &[("sfFoo*", None), ("int", None)]);
        handle_function(&mut ctx, &decl).unwrap();
        assert_eq!(
            class_body(&ctx, "system", "Foo"),
            vec![
                "def value=(arg1 : Int)",
                "  CSFML.foo_set_value(@this, arg1.to_i32)",
                "end",
                "",
            ]
        );
        assert!(ctx.modules["system"]
            .lib
            .contains(&"fun foo_set_value = sfFoo_setValue(arg0 : Foo, arg1 : Int32)".to_string()));
    }

    #[test]
    fn alternate_constructor_transfers_and_checks_null() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &["Texture"]);
        ctx.set_doc("\\return A new texture object, or NULL if it failed".into());
        let decl = function(
            "sfTexture*",
            "sfTexture_createFromFile",
            &[("const char*", Some("filename")), ("const sfIntRect*", Some("area"))],
        );
        handle_function(&mut ctx, &decl).unwrap();

        let body = class_body(&ctx, "graphics", "Texture");
        let def = body.iter().position(|l| l.starts_with("def ")).unwrap();
        assert_eq!(
            body[def..],
            [
                "def self.from_file(filename : String, area : IntRect?)",
                "  if area",
                "    carea = area",
                "    parea = pointerof(carea)",
                "  else",
                "    parea = Pointer(CSFML::IntRect).null",
                "  end",
                "  result = CSFML.texture_create_from_file(filename, parea)",
                "  result.null? ? nil : Texture.transfer_ptr(result)",
                "end",
                "",
            ]
        );
    }

    #[test]
    fn class_return_without_create_is_wrapped() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &["Texture", "Sprite"]);
        let decl = function("const sfTexture*", "sfSprite_getTexture", &[("const sfSprite*", Some("sprite"))]);
        handle_function(&mut ctx, &decl).unwrap();
        assert_eq!(
            class_body(&ctx, "graphics", "Sprite"),
            vec![
                "def texture",
                "  Texture.wrap_ptr(CSFML.sprite_get_texture(@this))",
                "end",
                "",
            ]
        );
    }

    #[test]
    fn static_function_gets_deprecated_root_alias() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "window", &[]);
        let decl = function("sfBool", "sfKeyboard_isKeyPressed", &[("sfKeyCode", Some("key"))]);
        handle_function(&mut ctx, &decl).unwrap();

        let module = &ctx.modules["window"];
        let section = &module.sections["Keyboard"];
        assert_eq!(section.kind, SectionKind::Module);
        assert_eq!(
            section.body,
            vec![
                "def self.is_key_pressed(key)",
                "  CSFML.keyboard_is_key_pressed(key) != 0",
                "end",
                "",
            ]
        );
        assert_eq!(
            module.root,
            vec![
                "@[Deprecated(\"Use `Keyboard.is_key_pressed` instead\")]",
                "def keyboard_is_key_pressed(key)",
                "  Keyboard.is_key_pressed(key)",
                "end",
                "",
            ]
        );
    }

    #[test]
    fn static_setter_alias_assigns() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "window", &[]);
        let decl = function("void", "sfMouse_setPosition", &[("sfVector2i", Some("position"))]);
        handle_function(&mut ctx, &decl).unwrap();
        let module = &ctx.modules["window"];
        assert_eq!(module.sections["Mouse"].body[0], "def self.position=(position)");
        assert_eq!(module.root[2], "  Mouse.position = position");
    }

    #[test]
    fn free_function_goes_to_root() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "system", &[]);
        let decl = function("void", "sfSleep", &[("sfTime", Some("duration"))]);
        handle_function(&mut ctx, &decl).unwrap();
        assert_eq!(
            ctx.modules["system"].root,
            vec!["def sleep(duration)", "  CSFML.sleep(duration)", "end", ""]
        );
    }

    #[test]
    fn narrow_string_variant_is_lib_only() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &["Text"]);
        let narrow = function(
            "void",
            "sfText_setString",
            &[("sfText*", Some("text")), ("const char*", Some("string"))],
        );
        let unicode = function(
            "void",
            "sfText_setUnicodeString",
            &[("sfText*", Some("text")), ("const sfUint32*", Some("string"))],
        );
        handle_function(&mut ctx, &narrow).unwrap();
        handle_function(&mut ctx, &unicode).unwrap();

        let module = &ctx.modules["graphics"];
        assert!(module
            .lib
            .contains(&"fun text_set_string = sfText_setString(text : Text, string : UInt8*)".to_string()));
        assert_eq!(
            class_body(&ctx, "graphics", "Text"),
            vec![
                "def string=(string : String)",
                "  cstring = string.chars.map(&.ord.to_u32) << 0_u32",
                "  CSFML.text_set_unicode_string(@this, cstring)",
                "end",
                "",
            ]
        );
    }

    #[test]
    fn struct_receiver_copies_back() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &[]);
        super::super::records::handle_record(
            &mut ctx,
            &RecordDecl {
                name: "sfTransform".into(),
                fields: vec![sfgen_core::Field {
                    ty: "float[9]".into(),
                    name: "matrix".into(),
                }],
            },
            super::super::records::RecordKind::Struct,
        )
        .unwrap();
        let translate = function(
            "void",
            "sfTransform_translate",
            &[("sfTransform*", Some("transform")), ("float", Some("x")), ("float", Some("y"))],
        );
        let inverse = function(
            "sfTransform",
            "sfTransform_getInverse",
            &[("const sfTransform*", Some("transform"))],
        );
        handle_function(&mut ctx, &translate).unwrap();
        handle_function(&mut ctx, &inverse).unwrap();

        let section = &ctx.modules["graphics"].sections["Transform"];
        assert_eq!(
            section.body,
            vec![
                "def translate(x : Number, y : Number)",
                "  cself = self",
                "  CSFML.transform_translate(pointerof(cself), x.to_f32, y.to_f32)",
                "  @matrix = cself.matrix",
                "end",
                "",
                "def inverse",
                "  cself = self",
                "  CSFML.transform_get_inverse(pointerof(cself))",
                "end",
                "",
            ]
        );
    }

    #[test]
    fn unregistered_class_degrades_to_raw_pointer() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &[]);
        let decl = function("void", "sfShape_destroy", &[("sfShape*", Some("shape"))]);
        handle_function(&mut ctx, &decl).unwrap();
        let module = &ctx.modules["graphics"];
        assert!(module
            .lib
            .contains(&"fun shape_destroy = sfShape_destroy(shape : Shape*)".to_string()));
        assert_eq!(module.sections["Shape"].kind, SectionKind::Module);
        assert_eq!(module.sections["Shape"].body[0], "def self.destroy(shape)");
    }

    #[test]
    fn rejected_function_emits_nothing() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "graphics", &["Text"]);
        ctx.set_doc("Set a wide string".into());
        let decl = function(
            "void",
            "sfText_setWideString",
            &[("sfText*", Some("text")), ("const wchar_t*", Some("string"))],
        );
        let err = handle_function(&mut ctx, &decl).unwrap_err();
        assert!(matches!(err, GenError::Skip(SkipReason::WideCharacter { .. })));
        assert_eq!(ctx.modules["graphics"].lib, vec!["type Text = Void*", ""]);
        assert!(ctx.take_doc().is_none());
    }

    #[test]
    fn function_pointer_alias() {
        let options = GeneratorOptions::default();
        let mut ctx = context(&options, "audio", &[]);
        let decl = FunctionPointerTypedef {
            return_type: "sfBool".into(),
            name: "sfSoundStreamGetDataCallback".into(),
            param_types: vec!["sfSoundStreamChunk*".into(), "void*".into()],
        };
        handle_function_pointer(&mut ctx, &decl).unwrap();
        let none = FunctionPointerTypedef {
            return_type: "void".into(),
            name: "sfCallback".into(),
            param_types: vec![],
        };
        handle_function_pointer(&mut ctx, &none).unwrap();
        assert_eq!(
            ctx.modules["audio"].lib,
            vec![
                "alias SoundStreamGetDataCallback = (SoundStreamChunk*, Void*) -> Int32",
                "",
                "alias Callback = -> Void",
                "",
            ]
        );
    }
}
