//! Declaration handlers, one per declaration kind.

mod class;
mod enums;
mod function;
mod records;

use sfgen_core::Declaration;

use crate::context::{GenerationContext, ModuleBuffers};
use crate::error::{GenError, Result};

/// Emit one declaration into the current module.
pub fn handle(ctx: &mut GenerationContext<'_>, decl: &Declaration) -> Result<()> {
    if ctx.current_module().is_none() {
        return Err(match ctx.ignored_region() {
            Some(module) => GenError::UnknownModule {
                module: module.to_string(),
                kind: decl.kind(),
                name: decl.name().unwrap_or("<anonymous>").to_string(),
            },
            None => outside_module(decl),
        });
    }
    match decl {
        Declaration::Enum(e) => enums::handle_enum(ctx, e),
        Declaration::Struct(r) => records::handle_record(ctx, r, records::RecordKind::Struct),
        Declaration::Union(r) => records::handle_record(ctx, r, records::RecordKind::Union),
        Declaration::OpaqueHandle(h) => class::handle_opaque(ctx, h),
        Declaration::Function(f) => function::handle_function(ctx, f),
        Declaration::FunctionPointer(f) => function::handle_function_pointer(ctx, f),
    }
}

fn outside_module(decl: &Declaration) -> GenError {
    GenError::DeclarationOutsideModule {
        kind: decl.kind(),
        name: decl.name().unwrap_or("<anonymous>").to_string(),
    }
}

/// Buffers of the current module. `handle` has already checked that one is
/// active.
fn buffers<'c>(ctx: &'c mut GenerationContext<'_>, what: &str) -> Result<&'c mut ModuleBuffers> {
    ctx.module_mut()
        .ok_or_else(|| GenError::DeclarationOutsideModule {
            kind: "declaration",
            name: what.to_string(),
        })
}

/// Doc comment lines for an optional threaded doc.
fn doc_lines(doc: Option<&str>) -> Vec<String> {
    doc.map(crate::doc::comment_lines).unwrap_or_default()
}

/// Indent every non-empty line by `width` spaces.
pub(crate) fn indented(lines: &[String], width: usize) -> impl Iterator<Item = String> + '_ {
    let pad = " ".repeat(width);
    lines.iter().map(move |line| {
        if line.is_empty() {
            String::new()
        } else {
            format!("{pad}{line}")
        }
    })
}

/// Greedy wrap of whole `items` at `width` columns, every line starting with
/// `indent`. Items are joined by single spaces and never split.
pub(crate) fn wrap_items<S: AsRef<str>>(items: &[S], width: usize, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for item in items {
        let item = item.as_ref();
        if line.is_empty() {
            line = format!("{indent}{item}");
        } else if line.len() + 1 + item.len() <= width {
            line.push(' ');
            line.push_str(item);
        } else {
            lines.push(std::mem::take(&mut line));
            line = format!("{indent}{item}");
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
