//! Enumerations and loose constant groups.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sfgen_core::naming::{enum_member_prefix, strip_library_prefix};
use sfgen_core::{EnumDecl, EnumValue};

use super::{buffers, doc_lines, wrap_items};
use crate::context::SectionKind;
use crate::error::Result;
use crate::options::EnumOrder;

/// Enums that belong to a class: (enum, class, alias inside the class).
const RELATED_CLASSES: &[(&str, &str, &str)] = &[
    ("KeyCode", "Keyboard", "Key"),
    ("MouseButton", "Mouse", "Button"),
    ("MouseWheel", "Mouse", "Wheel"),
    ("JoystickAxis", "Joystick", "Axis"),
    ("SensorType", "Sensor", "Type"),
    ("TextStyle", "Text", "Style"),
    ("SoundStatus", "SoundSource", "Status"),
    ("FtpStatus", "Ftp", "Status"),
    ("HttpMethod", "HttpRequest", "Method"),
    ("HttpStatus", "HttpResponse", "Status"),
    ("SocketStatus", "Socket", "Status"),
];

/// Bit-flag enums, stored as unsigned 32-bit.
const FLAG_ENUMS: &[&str] = &["WindowStyle", "TextStyle", "ContextAttribute"];

const WRAP_WIDTH: usize = 78;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("valid regex"));

fn related(name: &str) -> Option<(&'static str, &'static str)> {
    RELATED_CLASSES
        .iter()
        .find(|(e, _, _)| *e == name)
        .map(|(_, class, alias)| (*class, *alias))
}

/// High-level name of an enum: `Keyboard::Key` for related enums, else the
/// root alias.
pub fn alias_path(name: &str) -> String {
    match related(name) {
        Some((class, alias)) => format!("{class}::{alias}"),
        None => name.to_string(),
    }
}

pub(super) fn handle_enum(ctx: &mut crate::GenerationContext<'_>, decl: &EnumDecl) -> Result<()> {
    match &decl.name {
        Some(name) => handle_named(ctx, name, decl),
        None => handle_loose(ctx, decl),
    }
}

fn handle_named(ctx: &mut crate::GenerationContext<'_>, raw_name: &str, decl: &EnumDecl) -> Result<()> {
    let name = ctx.mapper().map_spelling(raw_name, None);
    let doc = ctx.take_doc();
    if decl.members.is_empty() {
        tracing::warn!(name = %name, "skipping enum without members");
        return Ok(());
    }

    let raw: Vec<&str> = decl.members.iter().map(|m| m.name.as_str()).collect();
    let cut = enum_member_prefix(&raw);
    let renames: HashMap<&str, &str> = raw.iter().map(|r| (*r, &r[cut..])).collect();

    let mut members: Vec<(&str, Option<&EnumValue>)> = decl
        .members
        .iter()
        .map(|m| (&m.name[cut..], m.value.as_ref()))
        .collect();
    if ctx.options.enum_order == EnumOrder::Value && decl.all_values_explicit() {
        members.sort_by_key(|(_, value)| match value {
            Some(EnumValue::Int(v)) => *v,
            _ => 0,
        });
    }

    let mut items: Vec<String> = members
        .iter()
        .map(|(member, value)| match value {
            Some(EnumValue::Int(v)) => format!("{member} = {v},"),
            Some(EnumValue::Expr(expr)) => {
                format!("{member} = {},", rename_references(expr, &renames))
            }
            None => format!("{member},"),
        })
        .collect();
    if let Some(last) = items.last_mut() {
        last.pop();
    }

    let mut header = format!("enum {name}");
    if FLAG_ENUMS.contains(&name.as_str()) {
        header.push_str(" : UInt32");
    }
    let docs = doc_lines(doc.as_deref());
    let lib_name = ctx.options.lib_name.clone();
    ctx.enums.register(&name);

    let module = buffers(ctx, raw_name)?;
    module.lib.extend(docs.iter().cloned());
    module.lib.push(header);
    // Lib bodies are indented once more when the file is assembled.
    module.lib.extend(wrap_items(&items, WRAP_WIDTH - 2, "  "));
    module.lib.push("end".to_string());
    module.lib.push(String::new());

    match related(&name) {
        Some((class, alias)) => {
            let section = module.section(class, SectionKind::Module);
            section.body.extend(docs);
            section.body.push(format!("alias {alias} = {lib_name}::{name}"));
            for (member, _) in &members {
                section.body.push(format!("{member} = {alias}::{member}"));
            }
            section.body.push(String::new());
        }
        None => {
            module.root.extend(docs);
            module.root.push(format!("alias {name} = {lib_name}::{name}"));
            module.root.push(String::new());
        }
    }
    tracing::debug!(name = %name, members = members.len(), "emitted enum");
    Ok(())
}

/// Replace references to sibling enumerators with their emitted names.
fn rename_references(expr: &str, renames: &HashMap<&str, &str>) -> String {
    IDENTIFIER
        .replace_all(expr, |caps: &Captures| {
            renames
                .get(&caps[0])
                .map_or_else(|| caps[0].to_string(), |renamed| renamed.to_string())
        })
        .into_owned()
}

/// An anonymous enum: one low-level constant per member, with C implicit
/// values computed.
fn handle_loose(ctx: &mut crate::GenerationContext<'_>, decl: &EnumDecl) -> Result<()> {
    let doc = ctx.take_doc();
    let mut known: HashMap<&str, i64> = HashMap::new();
    // Implicit value of the next member; unknown after an uncomputable one.
    let mut next: Option<i64> = Some(0);
    let mut lines = Vec::new();
    for member in &decl.members {
        let value = match &member.value {
            Some(EnumValue::Int(v)) => Some(*v),
            None => next,
            Some(EnumValue::Expr(expr)) => known.get(expr.trim()).copied(),
        };
        next = value.and_then(|v| v.checked_add(1));
        let Some(value) = value else {
            tracing::warn!(member = %member.name, "skipping constant with an uncomputable value");
            continue;
        };
        known.insert(&member.name, value);
        match strip_library_prefix(&member.name) {
            Ok(name) => lines.push(format!("{name} = {value}")),
            Err(e) => tracing::warn!("skipping constant: {e}"),
        }
    }

    let module = buffers(ctx, "anonymous enum")?;
    module.lib.extend(doc_lines(doc.as_deref()));
    module.lib.extend(lines);
    module.lib.push(String::new());
    Ok(())
}
