//! Crystal binding synthesis for flattened CSFML headers.
//!
//! A single forward pass over a [`DeclarationSource`] fills one set of
//! buffers per module; [`assemble`] then renders each non-empty module into a
//! low-level `lib` file and a high-level namespace file.
//!
//! ## Modules
//!
//! - [`options`]: generator options and the module graph
//! - [`context`]: per-run state threaded through every handler
//! - [`handlers`]: one handler per declaration kind
//! - [`rules`]: ordered renaming and accessor rules
//! - [`marshal`]: parameter and return value marshalling
//! - [`doc`]: documentation comment threading
//! - [`assemble`]: output file rendering

pub mod assemble;
pub mod context;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod marshal;
pub mod options;
pub mod rules;

use sfgen_source::{DeclarationSource, SourceItem};

// Re-export key types for convenience
pub use assemble::OutputFile;
pub use context::GenerationContext;
pub use error::{GenError, Result, SkipReason};
pub use options::{EnumOrder, GeneratorOptions, ModuleSpec};

/// Run the generator over a parsed declaration stream.
///
/// Declarations that cannot be bound are reported at `warn` level and
/// skipped. Markers of modules outside the graph open a region that is
/// ignored as long as it holds no declarations. Structural input errors (a
/// declaration in such a region, or before the first module marker) abort
/// the run.
pub fn generate(source: &DeclarationSource, options: &GeneratorOptions) -> Result<Vec<OutputFile>> {
    let mut ctx = GenerationContext::new(options)?;
    for item in &source.items {
        match item {
            SourceItem::ModuleBoundary(module) => {
                tracing::debug!(module = %module, "entering module");
                ctx.enter_module(module);
            }
            SourceItem::DocMarker(_) if ctx.ignored_region().is_some() => {}
            SourceItem::DocMarker(index) => match source.doc(*index) {
                Some(raw) => ctx.set_doc(doc::thread(raw, options.case)),
                None => tracing::warn!(
                    index,
                    blocks = source.docs.len(),
                    "documentation marker beyond the last block"
                ),
            },
            SourceItem::Declaration(decl) => match handlers::handle(&mut ctx, decl) {
                Ok(()) => {}
                Err(GenError::Skip(reason)) => tracing::warn!(
                    kind = decl.kind(),
                    name = decl.name().unwrap_or("<anonymous>"),
                    "{reason}"
                ),
                Err(e) => return Err(e),
            },
        }
    }
    tracing::debug!(classes = ctx.classes.len(), "generation pass finished");
    Ok(assemble::assemble(&ctx))
}
