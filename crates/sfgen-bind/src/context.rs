//! Per-run generation state.
//!
//! One [`GenerationContext`] is created per run and threaded by `&mut` through
//! every handler. Nothing outlives the run.

use indexmap::IndexMap;
use sfgen_core::{ClassRegistry, EnumRegistry, StructFieldIndex, TypeMapper};

use crate::error::Result;
use crate::options::GeneratorOptions;

/// How a high-level section is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// An opaque handle wrapper.
    Class,
    /// A namespace reached only through static functions or enum hints.
    Module,
    /// A reopened low-level value type.
    Struct,
}

/// One class, module or struct of the high-level file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub kind: SectionKind,
    /// Lines emitted before the opener (docs, aliases).
    pub preamble: Vec<String>,
    pub body: Vec<String>,
}

impl Section {
    /// The opening line, e.g. `class Texture`.
    pub fn opener(&self, lib_name: &str) -> String {
        match self.kind {
            SectionKind::Class => format!("class {}", self.name),
            SectionKind::Module => format!("module {}", self.name),
            SectionKind::Struct => format!("struct {lib_name}::{}", self.name),
        }
    }
}

/// Output buffers of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleBuffers {
    /// Declarations inside the `lib` block.
    pub lib: Vec<String>,
    pub sections: IndexMap<String, Section>,
    /// Free functions and aliases directly inside the namespace.
    pub root: Vec<String>,
}

impl ModuleBuffers {
    /// The section for `name`, created on first use. Requesting a class
    /// section upgrades an existing module section.
    pub fn section(&mut self, name: &str, kind: SectionKind) -> &mut Section {
        let section = self
            .sections
            .entry(name.to_string())
            .or_insert_with(|| Section {
                name: name.to_string(),
                kind,
                preamble: Vec::new(),
                body: Vec::new(),
            });
        if kind == SectionKind::Class && section.kind == SectionKind::Module {
            section.kind = SectionKind::Class;
        }
        section
    }

    pub fn is_empty(&self) -> bool {
        self.lib.is_empty() && self.sections.is_empty() && self.root.is_empty()
    }
}

/// All state of one generation run.
#[derive(Debug)]
pub struct GenerationContext<'o> {
    pub options: &'o GeneratorOptions,
    pub modules: IndexMap<String, ModuleBuffers>,
    pub classes: ClassRegistry,
    pub structs: StructFieldIndex,
    pub enums: EnumRegistry,
    current: Option<String>,
    /// Marker name of a region outside the module graph.
    ignored: Option<String>,
    pending_doc: Option<String>,
}

impl<'o> GenerationContext<'o> {
    /// A context with one empty buffer per module, in graph order.
    pub fn new(options: &'o GeneratorOptions) -> Result<Self> {
        let modules = options
            .module_order()?
            .into_iter()
            .map(|m| (m.name.clone(), ModuleBuffers::default()))
            .collect();
        Ok(GenerationContext {
            options,
            modules,
            classes: ClassRegistry::new(),
            structs: StructFieldIndex::new(),
            enums: EnumRegistry::new(),
            current: None,
            ignored: None,
            pending_doc: None,
        })
    }

    /// Switch to `module`. Any pending documentation is discarded.
    ///
    /// A module outside the graph (such as the typedef-only `config` header)
    /// starts an ignored region: nothing is current until the next marker.
    pub fn enter_module(&mut self, module: &str) {
        self.pending_doc = None;
        if self.modules.contains_key(module) {
            self.current = Some(module.to_string());
            self.ignored = None;
        } else {
            tracing::warn!(module, "module is not in the module graph, ignoring its region");
            self.current = None;
            self.ignored = Some(module.to_string());
        }
    }

    pub fn current_module(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Name of the ignored region the pass is in, if any.
    pub fn ignored_region(&self) -> Option<&str> {
        self.ignored.as_deref()
    }

    /// Buffers of the current module.
    pub fn module_mut(&mut self) -> Option<&mut ModuleBuffers> {
        let current = self.current.as_ref()?;
        self.modules.get_mut(current)
    }

    /// Replace the pending documentation.
    pub fn set_doc(&mut self, text: String) {
        self.pending_doc = Some(text);
    }

    /// Consume the pending documentation.
    pub fn take_doc(&mut self) -> Option<String> {
        self.pending_doc.take()
    }

    pub fn mapper(&self) -> TypeMapper<'_> {
        TypeMapper::new(&self.classes)
    }

    pub fn case(&self, name: &str) -> String {
        self.options.case.apply(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modules_created_in_graph_order() {
        let options = GeneratorOptions::default();
        let ctx = GenerationContext::new(&options).unwrap();
        let names: Vec<&String> = ctx.modules.keys().collect();
        assert_eq!(names, vec!["system", "window", "graphics", "audio", "network"]);
        assert!(ctx.current_module().is_none());
    }

    #[test]
    fn module_outside_graph_starts_ignored_region() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options).unwrap();
        ctx.enter_module("system");
        ctx.set_doc("system doc".into());
        ctx.enter_module("config");
        assert_eq!(ctx.current_module(), None);
        assert_eq!(ctx.ignored_region(), Some("config"));
        assert_eq!(ctx.take_doc(), None);

        ctx.enter_module("system");
        assert_eq!(ctx.current_module(), Some("system"));
        assert_eq!(ctx.ignored_region(), None);
    }

    #[test]
    fn module_boundary_discards_pending_doc() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options).unwrap();
        ctx.set_doc("stale".into());
        ctx.enter_module("system");
        assert_eq!(ctx.take_doc(), None);

        ctx.set_doc("fresh".into());
        assert_eq!(ctx.take_doc().as_deref(), Some("fresh"));
        assert_eq!(ctx.take_doc(), None);
    }

    #[test]
    fn module_section_upgrades_to_class() {
        let mut buffers = ModuleBuffers::default();
        buffers.section("Keyboard", SectionKind::Module);
        buffers.section("Text", SectionKind::Module);
        let text = buffers.section("Text", SectionKind::Class);
        assert_eq!(text.kind, SectionKind::Class);
        // Never downgraded.
        let text = buffers.section("Text", SectionKind::Module);
        assert_eq!(text.kind, SectionKind::Class);
        let order: Vec<&String> = buffers.sections.keys().collect();
        assert_eq!(order, vec!["Keyboard", "Text"]);
    }

    #[test]
    fn struct_opener_reopens_lib_record() {
        let section = Section {
            name: "Transform".into(),
            kind: SectionKind::Struct,
            preamble: vec![],
            body: vec![],
        };
        assert_eq!(section.opener("CSFML"), "struct CSFML::Transform");
    }
}
