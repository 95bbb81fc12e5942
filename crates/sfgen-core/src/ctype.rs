//! C type spelling decomposition.
//!
//! Spellings come out of the source reader already normalized
//! (`const sfTexture*`, `float[9]`, `unsigned int`). This module splits them
//! into qualifier, base name, pointer depth and array suffix. Function types
//! (`void (*)(void*)`) are recognized but not decomposed.

use crate::error::{CoreError, Result};

/// A decomposed C type spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSpelling {
    /// Whether a `const` qualifier appeared anywhere in the spelling.
    pub is_const: bool,
    /// Base type name with qualifiers and stars removed, e.g. `unsigned int`.
    pub base: String,
    /// Number of pointer stars.
    pub pointers: usize,
    /// Trailing `[N]` array size.
    pub array: Option<usize>,
}

impl CSpelling {
    /// Parse a type spelling.
    ///
    /// Examples:
    /// - `"const char*"`
    /// - `"sfRenderWindow*"`
    /// - `"float[9]"`
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(invalid(input, "empty spelling"));
        }
        if is_function_type(input) {
            return Err(invalid(input, "function types have no base spelling"));
        }

        // Trailing array suffix
        let (rest, array) = match input.strip_suffix(']') {
            Some(head) => {
                let open = head
                    .rfind('[')
                    .ok_or_else(|| invalid(input, "unbalanced ']'"))?;
                let size = head[open + 1..].trim();
                let size: usize = size
                    .parse()
                    .map_err(|_| invalid(input, &format!("array size '{size}' is not a number")))?;
                (&head[..open], Some(size))
            }
            None => (input, None),
        };

        let pointers = rest.matches('*').count();
        let mut is_const = false;
        let mut words = Vec::new();
        let spaced = rest.replace('*', " ");
        for word in spaced.split_whitespace() {
            if word == "const" {
                is_const = true;
            } else {
                words.push(word);
            }
        }
        if words.is_empty() {
            return Err(invalid(input, "missing base type"));
        }

        Ok(CSpelling {
            is_const,
            base: words.join(" "),
            pointers,
            array,
        })
    }

    /// Whether the base is the wide character type.
    pub fn is_wide_char(&self) -> bool {
        self.base == "wchar_t"
    }
}

impl std::fmt::Display for CSpelling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_const {
            write!(f, "const ")?;
        }
        write!(f, "{}{}", self.base, "*".repeat(self.pointers))?;
        if let Some(n) = self.array {
            write!(f, "[{n}]")?;
        }
        Ok(())
    }
}

/// Whether a spelling denotes a function type (inline function pointer).
pub fn is_function_type(spelling: &str) -> bool {
    spelling.contains("(*")
}

fn invalid(spelling: &str, detail: &str) -> CoreError {
    CoreError::InvalidTypeSpelling {
        spelling: spelling.to_string(),
        detail: detail.to_string(),
    }
}
