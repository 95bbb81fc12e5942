//! `sfgen.toml` parsing and run configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sfgen_bind::{EnumOrder, GeneratorOptions, ModuleSpec};
use sfgen_core::CaseRule;

pub const MANIFEST_FILE: &str = "sfgen.toml";

/// The top-level manifest structure. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SfgenManifest {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub naming: NamingConfig,
    /// Module graph; the standard CSFML graph when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<ModuleSpec>>,
}

/// Input files, relative to the manifest directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Flattened header produced by the flattening stage.
    pub header: PathBuf,
    /// Documentation blocks extracted alongside the header.
    pub docs: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            header: PathBuf::from("headers_gen.h"),
            docs: PathBuf::from("docs_gen.txt"),
        }
    }
}

/// Output location, relative to the manifest directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            dir: PathBuf::from("."),
        }
    }
}

/// Naming section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct NamingConfig {
    pub case: CaseRule,
    pub enum_order: EnumOrder,
}

/// Everything a command needs, with paths resolved against the project
/// directory.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub header: PathBuf,
    pub docs: PathBuf,
    pub output_dir: PathBuf,
    pub options: GeneratorOptions,
}

impl SfgenManifest {
    /// Search upward from `start_dir` for an `sfgen.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: SfgenManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing sfgen.toml")
    }

    /// Generator options described by this manifest.
    pub fn options(&self) -> GeneratorOptions {
        let mut options = GeneratorOptions {
            case: self.naming.case,
            enum_order: self.naming.enum_order,
            ..Default::default()
        };
        if let Some(modules) = &self.modules {
            options.modules = modules.clone();
        }
        options
    }

    /// Resolve paths against `project_dir`.
    pub fn run_config(&self, project_dir: &Path) -> RunConfig {
        RunConfig {
            header: project_dir.join(&self.input.header),
            docs: project_dir.join(&self.input.docs),
            output_dir: project_dir.join(&self.output.dir),
            options: self.options(),
        }
    }
}

/// Load the manifest from `cwd` upward, falling back to defaults rooted at
/// `cwd` when there is none.
pub fn load_run_config(cwd: &Path) -> Result<RunConfig> {
    match SfgenManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => {
            tracing::debug!(dir = %dir.display(), "using {MANIFEST_FILE}");
            Ok(manifest.run_config(&dir))
        }
        None => Ok(SfgenManifest::default().run_config(cwd)),
    }
}
