//! Flushes module buffers into output files.
//!
//! Each non-empty module produces `<module>_lib.cr` (the `lib` block) and
//! `<module>.cr` (the high-level namespace). Modules are emitted in module
//! graph order.

use std::path::{Path, PathBuf};

use crate::context::{GenerationContext, ModuleBuffers, Section, SectionKind};
use crate::error::{GenError, Result};
use crate::handlers::indented;
use crate::options::GeneratorOptions;

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    /// File name relative to the output directory.
    pub path: PathBuf,
    pub contents: String,
}

impl OutputFile {
    /// Write the file into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.path);
        std::fs::write(&path, &self.contents).map_err(|source| GenError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Render every non-empty module of a finished run.
pub fn assemble(ctx: &GenerationContext<'_>) -> Vec<OutputFile> {
    let options = ctx.options;
    let mut files = Vec::new();
    for (name, buffers) in &ctx.modules {
        if buffers.is_empty() {
            tracing::debug!(module = %name, "module has no content");
            continue;
        }
        let depends: Vec<&str> = options
            .module(name)
            .map(|m| m.depends.iter().map(String::as_str).collect())
            .unwrap_or_default();
        let requires: Vec<&str> = depends
            .into_iter()
            .filter(|dep| ctx.modules.get(*dep).is_some_and(|b| !b.is_empty()))
            .collect();

        files.push(OutputFile {
            path: PathBuf::from(format!("{name}_lib.cr")),
            contents: render_lib(options, name, &requires, buffers),
        });
        files.push(OutputFile {
            path: PathBuf::from(format!("{name}.cr")),
            contents: render_namespace(options, name, buffers),
        });
    }
    files
}

fn render_lib(options: &GeneratorOptions, module: &str, requires: &[&str], buffers: &ModuleBuffers) -> String {
    let mut out = Vec::new();
    for dep in requires {
        out.push(format!("require \"./{dep}_lib\""));
    }
    if !requires.is_empty() {
        out.push(String::new());
    }
    out.push(format!("@[Link(\"{}{module}\")]", options.link_prefix));
    out.push(format!("lib {}", options.lib_name));
    out.extend(indented(trim_trailing_blank(&buffers.lib), 2));
    out.push("end".to_string());
    finish(out)
}

fn render_namespace(options: &GeneratorOptions, module: &str, buffers: &ModuleBuffers) -> String {
    let mut out = vec![
        format!("require \"./{module}_lib\""),
        format!("require \"./{}\"", options.common_lib),
        String::new(),
        format!("module {}", options.namespace),
        "  extend self".to_string(),
        String::new(),
    ];
    for section in buffers.sections.values() {
        out.extend(render_section(options, section));
        out.push(String::new());
    }
    out.extend(indented(trim_trailing_blank(&buffers.root), 2));
    let keep = trim_trailing_blank(&out).len();
    out.truncate(keep);
    out.push("end".to_string());
    finish(out)
}

/// Preamble, then opener, body and `end`. A value type without methods only
/// gets its preamble.
fn render_section(options: &GeneratorOptions, section: &Section) -> Vec<String> {
    let mut out: Vec<String> = indented(&section.preamble, 2).collect();
    if section.kind == SectionKind::Struct && section.body.is_empty() {
        return out;
    }
    out.push(format!("  {}", section.opener(&options.lib_name)));
    out.extend(indented(trim_trailing_blank(&section.body), 4));
    out.push("  end".to_string());
    out
}

fn trim_trailing_blank(lines: &[String]) -> &[String] {
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .map_or(0, |i| i + 1);
    &lines[..end]
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_modules_are_skipped() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options).unwrap();
        ctx.enter_module("window");
        ctx.module_mut().unwrap().lib = lines(&["type Window = Void*", ""]);

        let files = assemble(&ctx);
        let names: Vec<_> = files.iter().map(|f| f.path.to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["window_lib.cr", "window.cr"]);
        // The empty system module is not required.
        assert!(files[0].contents.starts_with("@[Link(\"csfml-window\")]\n"));
    }

    #[test]
    fn lib_file_layout() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options).unwrap();
        ctx.enter_module("system");
        ctx.module_mut().unwrap().lib = lines(&["type Clock = Void*", ""]);
        ctx.enter_module("window");
        ctx.module_mut().unwrap().lib = lines(&["# A window.", "type Window = Void*", "", "struct VideoMode", "  width : Int32", "end", ""]);

        let files = assemble(&ctx);
        assert_eq!(
            files[2].contents,
            "require \"./system_lib\"\n\
             \n\
             @[Link(\"csfml-window\")]\n\
             lib CSFML\n\
             \x20 # A window.\n\
             \x20 type Window = Void*\n\
             \n\
             \x20 struct VideoMode\n\
             \x20   width : Int32\n\
             \x20 end\n\
             end\n"
        );
    }

    #[test]
    fn namespace_file_layout() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options).unwrap();
        ctx.enter_module("graphics");
        let module = ctx.module_mut().unwrap();
        module.lib = lines(&["struct Color", "  r : UInt8", "end", ""]);
        let color = module.section("Color", SectionKind::Struct);
        color.preamble = lines(&["alias Color = CSFML::Color"]);
        let sprite = module.section("Sprite", SectionKind::Class);
        sprite.preamble = lines(&["# A sprite."]);
        sprite.body = lines(&["def to_unsafe", "  @this", "end", ""]);
        module.root = lines(&["alias BlendFactor = CSFML::BlendFactor", ""]);

        let files = assemble(&ctx);
        assert_eq!(
            files[1].contents,
            "require \"./graphics_lib\"\n\
             require \"./common_lib\"\n\
             \n\
             module SF\n\
             \x20 extend self\n\
             \n\
             \x20 alias Color = CSFML::Color\n\
             \n\
             \x20 # A sprite.\n\
             \x20 class Sprite\n\
             \x20   def to_unsafe\n\
             \x20     @this\n\
             \x20   end\n\
             \x20 end\n\
             \n\
             \x20 alias BlendFactor = CSFML::BlendFactor\n\
             end\n"
        );
    }

    #[test]
    fn write_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = OutputFile {
            path: PathBuf::from("system.cr"),
            contents: "module SF\nend\n".to_string(),
        };
        let written = file.write_to(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(written).unwrap(), "module SF\nend\n");

        let missing = dir.path().join("missing");
        assert!(matches!(file.write_to(&missing), Err(GenError::Write { .. })));
    }
}
