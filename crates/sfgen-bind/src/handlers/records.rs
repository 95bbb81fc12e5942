//! Structs and unions.

use sfgen_core::typemap::is_aliased_record;
use sfgen_core::{CSpelling, MappedType, RecordDecl};

use super::{buffers, doc_lines};
use crate::context::SectionKind;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RecordKind {
    Struct,
    Union,
}

impl RecordKind {
    fn keyword(self) -> &'static str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Union => "union",
        }
    }
}

pub(super) fn handle_record(
    ctx: &mut crate::GenerationContext<'_>,
    decl: &RecordDecl,
    kind: RecordKind,
) -> Result<()> {
    if is_aliased_record(&decl.name) {
        tracing::debug!(name = %decl.name, "record is an alias of another record");
        ctx.take_doc();
        return Ok(());
    }

    let mapper = ctx.mapper();
    let name = mapper.map_spelling(&decl.name, None);
    let fields: Vec<(String, MappedType, Option<CSpelling>)> = decl
        .fields
        .iter()
        .map(|f| {
            (
                ctx.case(&f.name),
                mapper.map(&f.ty, Some(&f.name)),
                CSpelling::parse(&f.ty).ok(),
            )
        })
        .collect();

    let lib_name = ctx.options.lib_name.clone();
    let mut accessors = Vec::new();
    if kind == RecordKind::Struct {
        for (field, mapped, spelling) in &fields {
            let was_pointer = spelling.as_ref().is_some_and(|s| s.pointers > 0);
            if was_pointer && mapped.pointers == 0 && ctx.classes.contains(&mapped.base) {
                accessors.extend(class_accessors(&lib_name, field, &mapped.base));
            } else if mapped.is("Vector2f") || mapped.is("Vector2i") {
                accessors.extend(vector_accessors(&lib_name, field, &mapped.base));
            }
        }
    }

    let doc = ctx.take_doc();
    let docs = doc_lines(doc.as_deref());
    ctx.structs
        .record(&name, fields.iter().map(|(field, _, _)| field.clone()).collect());

    let module = buffers(ctx, &decl.name)?;
    module.lib.extend(docs.iter().cloned());
    module.lib.push(format!("{} {name}", kind.keyword()));
    for (field, mapped, _) in &fields {
        module.lib.push(format!("  {field} : {mapped}"));
    }
    module.lib.push("end".to_string());
    module.lib.push(String::new());

    let section = module.section(&name, SectionKind::Struct);
    section.preamble.extend(docs);
    section.preamble.push(format!("alias {name} = {lib_name}::{name}"));
    section.body.extend(accessors);
    tracing::debug!(name = %name, fields = fields.len(), "emitted {}", kind.keyword());
    Ok(())
}

/// Nil-safe accessors for a field holding a class handle.
fn class_accessors(lib_name: &str, field: &str, class: &str) -> Vec<String> {
    vec![
        format!("def {field} : {class}?"),
        format!("  @{field}.null? ? nil : {class}.wrap_ptr(@{field})"),
        "end".to_string(),
        String::new(),
        format!("def {field}=(value : {class}?)"),
        format!("  @{field} = value ? value.to_unsafe : {lib_name}::{class}.null"),
        "end".to_string(),
        String::new(),
    ]
}

/// Accessors repacking a 2D vector field.
fn vector_accessors(lib_name: &str, field: &str, vector: &str) -> Vec<String> {
    let conversion = if vector == "Vector2f" { "to_f32" } else { "to_i32" };
    vec![
        format!("def {field} : Vector2"),
        format!("  Vector2.new(@{field}.x, @{field}.y)"),
        "end".to_string(),
        String::new(),
        format!("def {field}=(value)"),
        format!(
            "  @{field} = {lib_name}::{vector}.new(x: value[0].{conversion}, y: value[1].{conversion})"
        ),
        "end".to_string(),
        String::new(),
    ]
}
