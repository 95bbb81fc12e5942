//! `sfgen inspect`: dump the parsed declaration stream as JSON.

use anyhow::{Context, Result};
use sfgen_source::DeclarationSource;

use crate::manifest::RunConfig;

/// The declaration stream, or one module's slice of it, as pretty JSON.
pub fn render(config: &RunConfig, module: Option<&str>) -> Result<String> {
    let source = DeclarationSource::load(&config.header, &config.docs)
        .context("loading declaration source")?;
    match module {
        Some(name) => {
            let items = source.module_items(name);
            if items.is_empty() {
                anyhow::bail!("module `{name}` does not appear in {}", config.header.display());
            }
            serde_json::to_string_pretty(&items).context("serializing declarations")
        }
        None => serde_json::to_string_pretty(&source).context("serializing declarations"),
    }
}

pub fn run(config: &RunConfig, module: Option<&str>) -> Result<()> {
    println!("{}", render(config, module)?);
    Ok(())
}
