//! Reader for flattened CSFML headers.
//!
//! The flattening stage concatenates every public header into one file,
//! separated by sentinel `enum` markers, and extracts documentation comments
//! into a side file. This crate turns that pair into an ordered stream of
//! [`SourceItem`]s.
//!
//! ## Modules
//!
//! - [`lexer`]: comment stripping, statement splitting, tokenization
//! - [`parse`]: statement classification into declarations and markers
//! - [`docs`]: documentation block file

pub mod docs;
pub mod error;
pub mod lexer;
pub mod parse;

use std::path::Path;

use serde::Serialize;
use sfgen_core::Declaration;

pub use error::SourceError;
use error::Result;

/// One element of the declaration stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceItem {
    /// Everything up to the next boundary belongs to this module.
    ModuleBoundary(String),
    /// The next declaration is documented by block `N` (1-based).
    DocMarker(usize),
    Declaration(Declaration),
}

/// The parsed declaration stream plus its documentation blocks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeclarationSource {
    pub items: Vec<SourceItem>,
    pub docs: Vec<String>,
}

impl DeclarationSource {
    /// Read the header and documentation files.
    pub fn load(header: &Path, docs: &Path) -> Result<Self> {
        let header_text = read(header)?;
        let docs_text = read(docs)?;
        Ok(Self::parse(&header_text, &docs_text))
    }

    /// Parse header and documentation text.
    ///
    /// Statements that cannot be read are reported and skipped; parsing never
    /// fails as a whole.
    pub fn parse(header: &str, docs: &str) -> Self {
        let text = lexer::strip_comments(header);
        let mut items = Vec::new();
        for stmt in lexer::split_statements(&text) {
            match parse::parse_statement(&stmt) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => tracing::trace!(line = stmt.line, "dropped plain typedef"),
                Err(e) => tracing::warn!("skipping statement: {e}"),
            }
        }
        tracing::debug!(items = items.len(), "read declaration stream");
        DeclarationSource {
            items,
            docs: docs::split_blocks(docs),
        }
    }

    /// Documentation block `index` (1-based).
    pub fn doc(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.docs.get(i))
            .map(String::as_str)
    }

    /// The items between the boundary of `module` and the next boundary.
    pub fn module_items(&self, module: &str) -> Vec<&SourceItem> {
        let mut inside = false;
        let mut out = Vec::new();
        for item in &self.items {
            if let SourceItem::ModuleBoundary(name) = item {
                inside = name == module;
            }
            if inside {
                out.push(item);
            }
        }
        out
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
;;;;enum SFML_System_Clock;;;;
typedef int sfBool;
typedef struct sfClock sfClock;
;;;;enum doc1;;;;
sfClock* sfClock_create(void);
int printf(const char* format, ...);
;;;;enum SFML_Window_Window;;;;
typedef struct sfWindow sfWindow;
";

    #[test]
    fn parse_stream_in_order() {
        let source = DeclarationSource::parse(HEADER, "\\brief Create a clock\n");
        assert_eq!(source.items.len(), 6);
        assert_eq!(source.items[0], SourceItem::ModuleBoundary("system".into()));
        assert!(matches!(&source.items[1], SourceItem::Declaration(Declaration::OpaqueHandle(h)) if h.name == "sfClock"));
        assert_eq!(source.items[2], SourceItem::DocMarker(1));
        assert!(matches!(&source.items[3], SourceItem::Declaration(Declaration::Function(f)) if f.name == "sfClock_create"));
        assert_eq!(source.items[4], SourceItem::ModuleBoundary("window".into()));
        assert_eq!(source.doc(1), Some("\\brief Create a clock"));
        assert_eq!(source.doc(0), None);
        assert_eq!(source.doc(2), None);
    }

    #[test]
    fn module_items_filter() {
        let source = DeclarationSource::parse(HEADER, "");
        let window = source.module_items("window");
        assert_eq!(window.len(), 2);
        assert!(source.module_items("audio").is_empty());
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("headers_gen.h");
        let docs = dir.path().join("docs_gen.txt");
        std::fs::write(&header, HEADER).unwrap();
        std::fs::write(&docs, "one\n--------\ntwo\n").unwrap();
        let source = DeclarationSource::load(&header, &docs).unwrap();
        assert_eq!(source.docs, vec!["one", "two"]);
    }

    #[test]
    fn load_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.h");
        let err = DeclarationSource::load(&missing, &missing).unwrap_err();
        assert!(err.to_string().contains("nope.h"));
    }
}
