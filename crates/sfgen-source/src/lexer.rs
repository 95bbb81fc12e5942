//! Statement splitting and tokenization for the flattened header dialect.

/// One top-level statement, without its terminating `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub text: String,
    /// 1-based line of the statement's first non-blank character.
    pub line: usize,
}

/// Remove `//` and `/* */` comments and `#` directive lines.
///
/// Newlines are preserved so that line numbers stay meaningful.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut at_line_start = true;
    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for n in chars.by_ref() {
                    if n == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && n == '/' {
                        break;
                    }
                    prev = n;
                }
            }
            '#' if at_line_start => {
                while let Some(&n) = chars.peek() {
                    if n == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            _ => {
                if c == '\n' {
                    at_line_start = true;
                } else if !c.is_whitespace() {
                    at_line_start = false;
                }
                out.push(c);
            }
        }
    }
    out
}

/// Split comment-free text into statements at `;` outside braces and parens.
/// Empty statements are dropped.
pub fn split_statements(text: &str) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut line = 1usize;
    let mut start_line: Option<usize> = None;

    for c in text.chars() {
        match c {
            '{' | '(' => depth += 1,
            '}' | ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if c == ';' && depth == 0 {
            if let Some(start) = start_line.take() {
                statements.push(Statement {
                    text: current.trim().to_string(),
                    line: start,
                });
            }
            current.clear();
        } else {
            if start_line.is_none() && !c.is_whitespace() {
                start_line = Some(line);
            }
            current.push(c);
        }
        if c == '\n' {
            line += 1;
        }
    }
    if let Some(start) = start_line {
        statements.push(Statement {
            text: current.trim().to_string(),
            line: start,
        });
    }
    statements
}

/// Split a statement into identifier, number and punctuation tokens.
/// `...`, `<<` and `>>` are single tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else {
            let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();
            let width = if rest.starts_with("...") {
                3
            } else if rest.starts_with("<<") || rest.starts_with(">>") {
                2
            } else {
                1
            };
            tokens.push(chars[i..i + width].iter().collect());
            i += width;
        }
    }
    tokens
}

/// Whether a token is an identifier or a number rather than punctuation.
pub fn is_word(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
}
