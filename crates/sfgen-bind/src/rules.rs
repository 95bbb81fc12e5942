//! Ordered rewrite rules for function and method names.
//!
//! Two pipelines run over every function. [`RENAME_RULES`] rewrites the
//! prefix-stripped C name (`Texture_createFromFile`) before class attribution.
//! [`METHOD_RULES`] rewrite the snake-cased method name after attribution,
//! turning accessors into properties. Each pipeline reports which rules fired.

use once_cell::sync::Lazy;
use regex::Regex;

/// Facts about the function being renamed.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// The full C name, prefix included.
    pub raw_name: &'a str,
    /// Whether the return type maps to a registered class.
    pub returns_class: bool,
}

/// A named rewrite of the prefix-stripped C name.
pub struct RenameRule {
    pub name: &'static str,
    pub apply: fn(&str, &RuleContext<'_>) -> Option<String>,
}

/// The rename pipeline, in application order.
pub const RENAME_RULES: &[RenameRule] = &[
    RenameRule {
        name: "constructor",
        apply: constructor,
    },
    RenameRule {
        name: "alternate-constructor",
        apply: alternate_constructor,
    },
    RenameRule {
        name: "variant-suffix",
        apply: variant_suffix,
    },
    RenameRule {
        name: "render-window-suffix",
        apply: render_window_suffix,
    },
    RenameRule {
        name: "shader-parameter",
        apply: shader_parameter,
    },
];

/// Result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renamed {
    pub name: String,
    pub applied: Vec<&'static str>,
}

impl Renamed {
    pub fn fired(&self, rule: &str) -> bool {
        self.applied.iter().any(|applied| *applied == rule)
    }
}

/// Run the rename pipeline over a prefix-stripped name.
pub fn rename(name: &str, ctx: &RuleContext<'_>) -> Renamed {
    let mut current = name.to_string();
    let mut applied = Vec::new();
    for rule in RENAME_RULES {
        if let Some(next) = (rule.apply)(&current, ctx) {
            tracing::trace!(rule = rule.name, from = %current, to = %next, "rename rule");
            current = next;
            applied.push(rule.name);
        }
    }
    Renamed {
        name: current,
        applied,
    }
}

static CONSTRUCTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_create(Unicode|With[A-Za-z0-9]*)?$").expect("valid regex"));
static ALTERNATE_CONSTRUCTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_createFrom([A-Z][A-Za-z0-9]*)$").expect("valid regex"));
static VARIANT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z][A-Za-z0-9]*?)(With|From)[A-Z][A-Za-z0-9]*$").expect("valid regex"));
static RENDER_WINDOW_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+_[gs]et.+)RenderWindow$").expect("valid regex"));
static SHADER_PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)_set.+Parameter$").expect("valid regex"));

fn constructor(name: &str, ctx: &RuleContext<'_>) -> Option<String> {
    if !ctx.returns_class {
        return None;
    }
    let caps = CONSTRUCTOR.captures(name)?;
    Some(format!("{}_initialize", &caps[1]))
}

fn alternate_constructor(name: &str, ctx: &RuleContext<'_>) -> Option<String> {
    if !ctx.returns_class {
        return None;
    }
    let caps = ALTERNATE_CONSTRUCTOR.captures(name)?;
    Some(format!("{}_from{}", &caps[1], &caps[2]))
}

/// Drops a `With...`/`From...` tail of the method segment, keeping a
/// non-empty stem: `Texture_updateFromImage` becomes `Texture_update`.
fn variant_suffix(name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
    let (class, method) = name.split_once('_')?;
    let caps = VARIANT_SUFFIX.captures(method)?;
    Some(format!("{class}_{}", &caps[1]))
}

fn render_window_suffix(name: &str, _ctx: &RuleContext<'_>) -> Option<String> {
    let caps = RENDER_WINDOW_SUFFIX.captures(name)?;
    Some(caps[1].to_string())
}

fn shader_parameter(name: &str, ctx: &RuleContext<'_>) -> Option<String> {
    if ctx.raw_name == "sfShader_setCurrentTextureParameter" {
        return None;
    }
    let caps = SHADER_PARAMETER.captures(name)?;
    let renamed = format!("{}_setParameter", &caps[1]);
    (renamed != name).then_some(renamed)
}

/// Facts about the method being named.
#[derive(Debug, Clone, Copy)]
pub struct MethodContext {
    /// Number of C parameters.
    pub arity: usize,
    /// Number of those that are the implicit receiver (0 or 1).
    pub receivers: usize,
    pub is_constructor: bool,
}

/// A named rewrite of the snake-cased method name.
pub struct MethodRule {
    pub name: &'static str,
    pub apply: fn(&str, &MethodContext) -> Option<String>,
}

/// The accessor pipeline, in application order.
pub const METHOD_RULES: &[MethodRule] = &[
    MethodRule {
        name: "getter",
        apply: getter,
    },
    MethodRule {
        name: "query",
        apply: query,
    },
    MethodRule {
        name: "setter",
        apply: setter,
    },
    MethodRule {
        name: "unicode-infix",
        apply: unicode_infix,
    },
    MethodRule {
        name: "destroy",
        apply: destroy,
    },
];

/// Run the accessor pipeline over a snake-cased method name.
pub fn method_name(name: &str, ctx: &MethodContext) -> Renamed {
    let mut current = name.to_string();
    let mut applied = Vec::new();
    for rule in METHOD_RULES {
        if let Some(next) = (rule.apply)(&current, ctx) {
            current = next;
            applied.push(rule.name);
        }
    }
    Renamed {
        name: current,
        applied,
    }
}

fn accessor_stem<'n>(name: &'n str, prefix: &str, ctx: &MethodContext) -> Option<&'n str> {
    if ctx.is_constructor {
        return None;
    }
    name.strip_prefix(prefix).filter(|stem| !stem.is_empty())
}

fn getter(name: &str, ctx: &MethodContext) -> Option<String> {
    if ctx.arity != ctx.receivers {
        return None;
    }
    accessor_stem(name, "get_", ctx).map(str::to_string)
}

fn query(name: &str, ctx: &MethodContext) -> Option<String> {
    if ctx.arity != ctx.receivers {
        return None;
    }
    if let Some(stem) = accessor_stem(name, "is_", ctx) {
        return Some(format!("{stem}?"));
    }
    accessor_stem(name, "has_", ctx).map(|_| format!("{name}?"))
}

fn setter(name: &str, ctx: &MethodContext) -> Option<String> {
    if ctx.arity != ctx.receivers + 1 {
        return None;
    }
    accessor_stem(name, "set_", ctx).map(|stem| format!("{stem}="))
}

fn unicode_infix(name: &str, _ctx: &MethodContext) -> Option<String> {
    if let Some(rest) = name.strip_prefix("unicode_") {
        return Some(rest.to_string());
    }
    name.contains("_unicode_")
        .then(|| name.replacen("_unicode_", "_", 1))
}

fn destroy(name: &str, ctx: &MethodContext) -> Option<String> {
    (name == "destroy" && ctx.receivers == 1).then(|| "finalize".to_string())
}
