//! Generator options.
//!
//! Every field has a default, so an empty configuration reproduces the
//! standard CSFML layout.

use serde::{Deserialize, Serialize};
use sfgen_core::CaseRule;

use crate::error::{GenError, Result};

/// Ordering of enum members in the low-level file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnumOrder {
    /// Ascending by value when every member has an explicit integer value.
    #[default]
    Value,
    /// Always keep declaration order.
    Declaration,
}

/// One logical module and the modules its low-level file requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub depends: Vec<String>,
}

impl ModuleSpec {
    pub fn new(name: &str, depends: &[&str]) -> Self {
        ModuleSpec {
            name: name.to_string(),
            depends: depends.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Options controlling a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorOptions {
    pub case: CaseRule,
    pub enum_order: EnumOrder,
    pub modules: Vec<ModuleSpec>,
    /// Name of the low-level `lib` block.
    pub lib_name: String,
    /// Name of the high-level module.
    pub namespace: String,
    /// Prefix of the native library name in `@[Link(...)]`.
    pub link_prefix: String,
    /// Hand-written support file required by every high-level file.
    pub common_lib: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        GeneratorOptions {
            case: CaseRule::default(),
            enum_order: EnumOrder::default(),
            modules: vec![
                ModuleSpec::new("system", &[]),
                ModuleSpec::new("window", &["system"]),
                ModuleSpec::new("graphics", &["system", "window"]),
                ModuleSpec::new("audio", &["system"]),
                ModuleSpec::new("network", &["system"]),
            ],
            lib_name: "CSFML".to_string(),
            namespace: "SF".to_string(),
            link_prefix: "csfml-".to_string(),
            common_lib: "common_lib".to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Modules in dependency order: every module follows its dependencies,
    /// otherwise configuration order is kept.
    pub fn module_order(&self) -> Result<Vec<&ModuleSpec>> {
        for module in &self.modules {
            for dep in &module.depends {
                if !self.modules.iter().any(|m| &m.name == dep) {
                    return Err(GenError::ModuleGraph {
                        detail: format!("`{}` depends on unknown module `{dep}`", module.name),
                    });
                }
            }
        }

        let mut ordered: Vec<&ModuleSpec> = Vec::with_capacity(self.modules.len());
        while ordered.len() < self.modules.len() {
            let next = self.modules.iter().find(|m| {
                !ordered.iter().any(|o| o.name == m.name)
                    && m.depends
                        .iter()
                        .all(|d| ordered.iter().any(|o| &o.name == d))
            });
            match next {
                Some(module) => ordered.push(module),
                None => {
                    return Err(GenError::ModuleGraph {
                        detail: "dependency cycle".to_string(),
                    })
                }
            }
        }
        Ok(ordered)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.name == name)
    }
}
