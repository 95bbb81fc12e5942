//! Documentation threading: raw doc blocks to target comment text.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sfgen_core::CaseRule;

static CODE_EXAMPLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(Example:\s+)?\\code.+?\\endcode\n?").expect("valid regex"));
static PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\param ([A-Za-z0-9_]+)").expect("valid regex"));
static ARG_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\a ([A-Za-z0-9_]+)").expect("valid regex"));
static LIBRARY_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bsf([A-Z][A-Za-z0-9]*)(_[A-Za-z0-9_]+)?\b").expect("valid regex")
});
static CAMEL_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z][a-z0-9]*[A-Z][A-Za-z0-9]*\b").expect("valid regex"));
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("valid regex"));

/// Rewrite one raw documentation block.
pub fn thread(raw: &str, case: CaseRule) -> String {
    let doc = CODE_EXAMPLE.replace_all(raw.trim(), "");
    let doc = doc.replace("\\brief ", "");
    let doc = doc.replacen("\\param", "*Arguments*:\n\n\\param", 1);
    let doc = PARAM.replace_all(&doc, "* `$1`: ");
    let doc = doc.replace("\\li ", "- ");
    let doc = ARG_REF.replace_all(&doc, "`$1`");
    let doc = doc.replace("\\return ", "*Returns*: ");
    let doc = LIBRARY_NAME.replace_all(&doc, |caps: &Captures| match caps.get(2) {
        Some(method) => case.apply(&format!("{}{}", &caps[1], method.as_str())),
        None => caps[1].to_string(),
    });
    let doc = CAMEL_CASE.replace_all(&doc, |caps: &Captures| case.apply(&caps[0]));
    let doc = SPACES.replace_all(&doc, " ");
    doc.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Render threaded text as `#` comment lines.
pub fn comment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {line}")
            }
        })
        .collect()
}
