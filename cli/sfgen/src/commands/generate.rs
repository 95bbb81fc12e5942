//! `sfgen generate`: render the bindings and write them, or check them.

use std::fs;

use anyhow::{Context, Result};
use sfgen_bind::OutputFile;
use sfgen_source::DeclarationSource;

use crate::manifest::RunConfig;

/// Read the declaration source and render every output file.
pub fn render(config: &RunConfig) -> Result<Vec<OutputFile>> {
    let source = DeclarationSource::load(&config.header, &config.docs)
        .context("loading declaration source")?;
    sfgen_bind::generate(&source, &config.options).context("generating bindings")
}

/// Generate the bindings. With `check`, nothing is written and the command
/// fails when any file on disk differs from the rendered output.
pub fn run(config: &RunConfig, check: bool) -> Result<()> {
    let files = render(config)?;
    if check {
        return check_files(config, &files);
    }

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    for file in &files {
        let path = file.write_to(&config.output_dir)?;
        println!("  wrote {}", path.display());
    }
    println!("Generated {} files in {}", files.len(), config.output_dir.display());
    Ok(())
}

fn check_files(config: &RunConfig, files: &[OutputFile]) -> Result<()> {
    let mut stale = Vec::new();
    for file in files {
        let path = config.output_dir.join(&file.path);
        match fs::read_to_string(&path) {
            Ok(existing) if existing == file.contents => {}
            _ => stale.push(file.path.display().to_string()),
        }
    }
    if stale.is_empty() {
        println!("{} files up to date", files.len());
        Ok(())
    } else {
        anyhow::bail!("{} file(s) out of date: {}", stale.len(), stale.join(", "))
    }
}
