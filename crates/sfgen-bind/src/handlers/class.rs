//! Opaque handles: low-level `type X = Void*` plus the wrapper class shell.

use sfgen_core::naming::strip_library_prefix;
use sfgen_core::OpaqueHandleDecl;

use super::{buffers, doc_lines};
use crate::context::SectionKind;
use crate::error::{Result, SkipReason};

pub(super) fn handle_opaque(ctx: &mut crate::GenerationContext<'_>, decl: &OpaqueHandleDecl) -> Result<()> {
    let name = strip_library_prefix(&decl.name)
        .map_err(SkipReason::from)?
        .to_string();
    let doc = ctx.take_doc();
    if !ctx.classes.register(&name) {
        tracing::debug!(class = %name, "opaque handle declared again");
        return Ok(());
    }
    let lib_name = ctx.options.lib_name.clone();
    let docs = doc_lines(doc.as_deref());
    let shell = class_shell(&lib_name, &name);

    let module = buffers(ctx, &decl.name)?;
    module.lib.extend(docs.iter().cloned());
    module.lib.push(format!("type {name} = Void*"));
    module.lib.push(String::new());

    let section = module.section(&name, SectionKind::Class);
    section.preamble.extend(docs);
    section.body.splice(0..0, shell);
    tracing::debug!(class = %name, "registered class");
    Ok(())
}

/// Handle storage, raw constructor, pointer wrapping and `to_unsafe`.
fn class_shell(lib_name: &str, name: &str) -> Vec<String> {
    let raw = format!("{lib_name}::{name}");
    [
        format!("@this : {raw}"),
        "@owned = false".to_string(),
        String::new(),
        format!("protected def initialize(@this : {raw}, @owned : Bool)"),
        "end".to_string(),
        String::new(),
        "# Wraps `ptr` without taking ownership of it.".to_string(),
        format!("def self.wrap_ptr(ptr : {raw}) : self"),
        "  new(ptr, false)".to_string(),
        "end".to_string(),
        String::new(),
        "# Wraps `ptr` and takes ownership of it.".to_string(),
        format!("def self.transfer_ptr(ptr : {raw}) : self"),
        "  new(ptr, true)".to_string(),
        "end".to_string(),
        String::new(),
        "def to_unsafe".to_string(),
        "  @this".to_string(),
        "end".to_string(),
        String::new(),
    ]
    .into()
}
