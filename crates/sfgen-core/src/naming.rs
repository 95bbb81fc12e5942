//! Naming engine: library prefix handling and identifier case conversion.
//!
//! Every function here is a pure string rule. The generator composes them;
//! nothing in this module knows about modules, classes or output buffers.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// The prefix every public name of the bound library carries.
pub const LIBRARY_PREFIX: &str = "sf";

/// Remove the library prefix from `name`.
pub fn strip_library_prefix(name: &str) -> Result<&str> {
    name.strip_prefix(LIBRARY_PREFIX)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| CoreError::MissingLibraryPrefix {
            name: name.to_string(),
            prefix: LIBRARY_PREFIX,
        })
}

/// Remove the library prefix when present, otherwise return `name` unchanged.
pub fn strip_library_prefix_lenient(name: &str) -> &str {
    strip_library_prefix(name).unwrap_or(name)
}

/// Identifier case conversion rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaseRule {
    /// Separator before every capital: `getGLFunction` → `get_g_l_function`.
    Simple,
    /// Capital runs are kept together: `getGLFunction` → `get_gl_function`.
    #[default]
    AcronymAware,
}

impl CaseRule {
    /// Convert `name` to snake case under this rule.
    pub fn apply(self, name: &str) -> String {
        match self {
            CaseRule::Simple => to_snake_case_simple(name),
            CaseRule::AcronymAware => to_snake_case(name),
        }
    }
}

/// Acronym-aware snake case conversion.
///
/// A capital that is followed by a non-capital gets a separator before it.
/// Any other run of capitals (an acronym, or a capital at the very end) is
/// wrapped in separators. Separator runs collapse and the result is trimmed.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_uppercase() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_uppercase() {
            i += 1;
        }
        let run = &chars[start..i];
        // The last capital of a run that continues in lower case starts a word.
        let (acronym, word_start) = if i < chars.len() {
            (&run[..run.len() - 1], Some(run[run.len() - 1]))
        } else {
            (run, None)
        };
        if !acronym.is_empty() {
            out.push('_');
            out.extend(acronym.iter().map(|c| c.to_ascii_lowercase()));
            out.push('_');
        }
        if let Some(c) = word_start {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        }
    }
    collapse_separators(&out)
}

/// Historical conversion: a separator before every capital.
pub fn to_snake_case_simple(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 8);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    collapse_separators(&out)
}

fn collapse_separators(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('_').to_string()
}

/// Uppercase the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Length in characters of the longest prefix shared by all `strings`.
pub fn common_prefix_length<S: AsRef<str>>(strings: &[S]) -> usize {
    let Some(first) = strings.first() else {
        return 0;
    };
    let first: Vec<char> = first.as_ref().chars().collect();
    let mut len = first.len();
    for s in &strings[1..] {
        let shared = s
            .as_ref()
            .chars()
            .zip(first.iter())
            .take_while(|(a, b)| a == *b)
            .count();
        len = len.min(shared);
    }
    len
}

/// The prefix to strip from enumerator names.
///
/// Starts from [`common_prefix_length`] and backs off until every remainder is
/// non-empty and starts with an uppercase letter, so `sfKeyA, sfKeyAdd` strips
/// `sfKey` rather than `sfKeyA`.
pub fn enum_member_prefix<S: AsRef<str>>(members: &[S]) -> usize {
    let names: Vec<Vec<char>> = members.iter().map(|m| m.as_ref().chars().collect()).collect();
    let mut len = common_prefix_length(members);
    while len > 0 {
        let clean = names
            .iter()
            .all(|n| n.get(len).is_some_and(|c| c.is_ascii_uppercase()));
        if clean {
            break;
        }
        len -= 1;
    }
    len
}
