//! Statement classification.
//!
//! Each statement of the flattened header is one of a small set of shapes.
//! Anything else is rejected with [`SourceError::Unparseable`] and left to the
//! caller to report.

use sfgen_core::{
    Declaration, EnumDecl, EnumMember, EnumValue, Field, FunctionDecl, FunctionPointerTypedef,
    OpaqueHandleDecl, Param, RecordDecl,
};

use crate::error::{Result, SourceError};
use crate::lexer::{is_word, tokenize, Statement};
use crate::SourceItem;

/// Words that can end a type spelling but never name a declarator.
const TYPE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "size_t",
    "const", "volatile", "struct", "union", "enum",
];

/// Classify one statement. `Ok(None)` means the statement is valid but
/// produces nothing (plain typedef aliases).
pub fn parse_statement(stmt: &Statement) -> Result<Option<SourceItem>> {
    let mut tokens = tokenize(&stmt.text);
    while tokens.first().is_some_and(|t| t == "extern" || t == "static" || t == "inline") {
        tokens.remove(0);
    }
    let parser = StatementParser {
        tokens: &tokens,
        line: stmt.line,
    };
    parser.parse()
}

struct StatementParser<'a> {
    tokens: &'a [String],
    line: usize,
}

impl StatementParser<'_> {
    fn parse(&self) -> Result<Option<SourceItem>> {
        let toks = self.tokens;
        match toks.first().map(String::as_str) {
            None => Ok(None),
            Some("typedef") => self.parse_typedef(&toks[1..]),
            Some("enum") if !toks.iter().any(|t| t == "(") => self.parse_enum_statement(&toks[1..]),
            Some(kw @ ("struct" | "union")) if !toks.iter().any(|t| t == "(") => {
                self.parse_tagged_record(kw, &toks[1..])
            }
            Some(_) if toks.iter().any(|t| t == "(") => self.parse_function(toks),
            Some(_) => Err(self.unparseable("not a declaration")),
        }
    }

    fn unparseable(&self, detail: &str) -> SourceError {
        SourceError::Unparseable {
            line: self.line,
            detail: format!("{detail}: `{}`", self.tokens.join(" ")),
        }
    }

    /// `enum NAME` markers and untypedef'd `enum [TAG] { ... }` groups.
    fn parse_enum_statement(&self, rest: &[String]) -> Result<Option<SourceItem>> {
        match rest {
            [name] if is_word(name) => self.parse_marker(name).map(Some),
            _ => {
                let (tag, body) = self.split_tag_and_body(rest)?;
                if !body.trailing.is_empty() {
                    return Err(self.unparseable("unexpected tokens after enum body"));
                }
                let members = self.parse_enum_members(body.inner)?;
                Ok(Some(SourceItem::Declaration(Declaration::Enum(EnumDecl {
                    name: tag.map(str::to_string),
                    members,
                }))))
            }
        }
    }

    fn parse_marker(&self, name: &str) -> Result<SourceItem> {
        if let Some(index) = name.strip_prefix("doc") {
            if let Ok(index) = index.parse::<usize>() {
                return Ok(SourceItem::DocMarker(index));
            }
        }
        match name.split('_').nth(1) {
            Some(module) if !module.is_empty() => Ok(SourceItem::ModuleBoundary(module.to_lowercase())),
            _ => Err(self.unparseable("marker names neither a doc block nor a module")),
        }
    }

    /// `struct TAG` and `struct TAG { ... }`.
    fn parse_tagged_record(&self, kw: &str, rest: &[String]) -> Result<Option<SourceItem>> {
        match rest {
            [tag] if is_word(tag) => Ok(Some(opaque(tag))),
            _ => {
                let (tag, body) = self.split_tag_and_body(rest)?;
                let name = tag.ok_or_else(|| self.unparseable("anonymous record"))?;
                if !body.trailing.is_empty() {
                    return Err(self.unparseable("unexpected tokens after record body"));
                }
                let fields = self.parse_fields(body.inner)?;
                Ok(Some(record(kw, name, fields)))
            }
        }
    }

    fn parse_typedef(&self, rest: &[String]) -> Result<Option<SourceItem>> {
        match rest.first().map(String::as_str) {
            Some("enum") if rest.iter().any(|t| t == "{") => {
                let (_, body) = self.split_tag_and_body(&rest[1..])?;
                let name = self.single_name(body.trailing)?;
                let members = self.parse_enum_members(body.inner)?;
                Ok(Some(SourceItem::Declaration(Declaration::Enum(EnumDecl {
                    name: Some(name.to_string()),
                    members,
                }))))
            }
            Some(kw @ ("struct" | "union")) if rest.iter().any(|t| t == "{") => {
                let (_, body) = self.split_tag_and_body(&rest[1..])?;
                let name = self.single_name(body.trailing)?;
                let fields = self.parse_fields(body.inner)?;
                Ok(Some(record(kw, name, fields)))
            }
            Some("struct" | "union") => match &rest[1..] {
                [_tag, name] if is_word(name) => Ok(Some(opaque(name))),
                [tag] if is_word(tag) => Ok(Some(opaque(tag))),
                _ => Err(self.unparseable("malformed record typedef")),
            },
            Some(_) if rest.iter().any(|t| t == "(") => self.parse_function_pointer(rest).map(Some),
            Some(_) => Ok(None),
            None => Err(self.unparseable("empty typedef")),
        }
    }

    /// `R ( * NAME ) ( params )`.
    fn parse_function_pointer(&self, toks: &[String]) -> Result<SourceItem> {
        let open = position(toks, "(").ok_or_else(|| self.unparseable("missing '('"))?;
        let close = matching(toks, open).ok_or_else(|| self.unparseable("unbalanced '('"))?;
        let name = match &toks[open + 1..close] {
            [star, name] if star == "*" && is_word(name) => name.clone(),
            _ => return Err(self.unparseable("expected `(*NAME)`")),
        };
        let params_open = close + 1;
        if toks.get(params_open).map(String::as_str) != Some("(") {
            return Err(self.unparseable("missing parameter list"));
        }
        let params_close =
            matching(toks, params_open).ok_or_else(|| self.unparseable("unbalanced '('"))?;
        let (params, variadic) = self.parse_params(&toks[params_open + 1..params_close])?;
        if variadic {
            return Err(SourceError::Variadic {
                line: self.line,
                name,
            });
        }
        Ok(SourceItem::Declaration(Declaration::FunctionPointer(
            FunctionPointerTypedef {
                return_type: spelling(&toks[..open]),
                name,
                param_types: params.into_iter().map(|p| p.ty).collect(),
            },
        )))
    }

    /// `R NAME ( params )`.
    fn parse_function(&self, toks: &[String]) -> Result<Option<SourceItem>> {
        let open = position(toks, "(").ok_or_else(|| self.unparseable("missing '('"))?;
        let close = matching(toks, open).ok_or_else(|| self.unparseable("unbalanced '('"))?;
        if close + 1 != toks.len() {
            return Err(self.unparseable("unsupported declarator"));
        }
        if open < 2 {
            return Err(self.unparseable("missing return type"));
        }
        let name = &toks[open - 1];
        if !is_word(name) {
            return Err(self.unparseable("missing function name"));
        }
        let (params, variadic) = self.parse_params(&toks[open + 1..close])?;
        if variadic {
            return Err(SourceError::Variadic {
                line: self.line,
                name: name.clone(),
            });
        }
        Ok(Some(SourceItem::Declaration(Declaration::Function(FunctionDecl {
            return_type: spelling(&toks[..open - 1]),
            name: name.clone(),
            params,
        }))))
    }

    /// Parameters and whether the list ends in `...`.
    fn parse_params(&self, toks: &[String]) -> Result<(Vec<Param>, bool)> {
        let parts = split_top_level(toks, ",");
        if parts.len() == 1 && (parts[0].is_empty() || parts[0] == ["void"]) {
            return Ok((Vec::new(), false));
        }
        let mut params = Vec::with_capacity(parts.len());
        let mut variadic = false;
        for part in parts {
            if part == ["..."] {
                variadic = true;
                continue;
            }
            if part.is_empty() {
                return Err(self.unparseable("empty parameter"));
            }
            params.push(self.parse_param(part)?);
        }
        Ok((params, variadic))
    }

    fn parse_param(&self, toks: &[String]) -> Result<Param> {
        if let Some(open) = position(toks, "(") {
            // Inline function pointer: `R (*name)(args)`.
            let close = matching(toks, open).ok_or_else(|| self.unparseable("unbalanced '('"))?;
            let name = toks[open + 1..close].iter().find(|t| is_word(t)).cloned();
            let args_open = close + 1;
            let args = match toks.get(args_open).map(String::as_str) {
                Some("(") => {
                    let args_close = matching(toks, args_open)
                        .ok_or_else(|| self.unparseable("unbalanced '('"))?;
                    let (args, _) = self.parse_params(&toks[args_open + 1..args_close])?;
                    args.into_iter().map(|a| a.ty).collect::<Vec<_>>().join(", ")
                }
                _ => String::new(),
            };
            return Ok(Param {
                ty: format!("{} (*)({args})", spelling(&toks[..open])),
                name,
            });
        }

        let (toks, array) = self.split_array_suffix(toks)?;
        let words: Vec<&String> = toks
            .iter()
            .filter(|t| is_word(t) && *t != "const" && *t != "volatile")
            .collect();
        let last = toks.last().map(String::as_str).unwrap_or_default();
        let named = words.len() >= 2 && is_word(last) && !TYPE_KEYWORDS.contains(&last);
        let (ty_toks, name) = if named {
            (&toks[..toks.len() - 1], Some(last))
        } else {
            (toks, None)
        };
        Ok(Param::new(with_array(spelling(ty_toks), array), name))
    }

    /// Record fields, including comma-separated declarators sharing a type.
    fn parse_fields(&self, toks: &[String]) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        for decl in split_top_level(toks, ";") {
            if decl.is_empty() {
                continue;
            }
            let declarators = split_top_level(decl, ",");
            let (first, array) = self.split_array_suffix(declarators[0])?;
            let name = match first.last() {
                Some(name) if is_word(name) && first.len() >= 2 => name,
                _ => return Err(self.unparseable("field without a name")),
            };
            if first.iter().any(|t| t == "(" || t == ":") {
                return Err(self.unparseable("unsupported field declarator"));
            }
            let type_toks = &first[..first.len() - 1];
            fields.push(Field {
                ty: with_array(spelling(type_toks), array),
                name: name.clone(),
            });

            // Later declarators share the base type but carry their own stars.
            let base: Vec<String> = type_toks.iter().filter(|t| *t != "*").cloned().collect();
            for extra in &declarators[1..] {
                let (extra, array) = self.split_array_suffix(extra)?;
                let name = match extra.last() {
                    Some(name) if is_word(name) => name,
                    _ => return Err(self.unparseable("field without a name")),
                };
                let mut ty = base.clone();
                ty.extend(extra[..extra.len() - 1].iter().filter(|t| *t == "*").cloned());
                fields.push(Field {
                    ty: with_array(spelling(&ty), array),
                    name: name.clone(),
                });
            }
        }
        Ok(fields)
    }

    fn parse_enum_members(&self, toks: &[String]) -> Result<Vec<EnumMember>> {
        let mut members = Vec::new();
        for part in split_top_level(toks, ",") {
            match part {
                [] => continue,
                [name] if is_word(name) => members.push(EnumMember {
                    name: name.clone(),
                    value: None,
                }),
                [name, eq, value @ ..] if is_word(name) && eq == "=" && !value.is_empty() => {
                    members.push(EnumMember {
                        name: name.clone(),
                        value: Some(enum_value(value)),
                    });
                }
                _ => return Err(self.unparseable("malformed enumerator")),
            }
        }
        Ok(members)
    }

    /// Split `[TAG] { inner } trailing...`.
    fn split_tag_and_body<'t>(&self, toks: &'t [String]) -> Result<(Option<&'t str>, Body<'t>)> {
        let open = position(toks, "{").ok_or_else(|| self.unparseable("missing '{'"))?;
        let close = matching(toks, open).ok_or_else(|| self.unparseable("unbalanced '{'"))?;
        let tag = match &toks[..open] {
            [] => None,
            [tag] if is_word(tag) => Some(tag.as_str()),
            _ => return Err(self.unparseable("malformed tag")),
        };
        Ok((
            tag,
            Body {
                inner: &toks[open + 1..close],
                trailing: &toks[close + 1..],
            },
        ))
    }

    fn single_name<'t>(&self, toks: &'t [String]) -> Result<&'t str> {
        match toks {
            [name] if is_word(name) => Ok(name),
            _ => Err(self.unparseable("expected a single typedef name")),
        }
    }

    fn split_array_suffix<'t>(&self, toks: &'t [String]) -> Result<(&'t [String], Option<String>)> {
        match toks {
            [head @ .., open, size, close] if open == "[" && close == "]" => {
                Ok((head, Some(size.clone())))
            }
            [.., close] if close == "]" => Err(self.unparseable("unsupported array declarator")),
            _ => Ok((toks, None)),
        }
    }
}

struct Body<'t> {
    inner: &'t [String],
    trailing: &'t [String],
}

fn opaque(name: &str) -> SourceItem {
    SourceItem::Declaration(Declaration::OpaqueHandle(OpaqueHandleDecl {
        name: name.to_string(),
    }))
}

fn record(kw: &str, name: &str, fields: Vec<Field>) -> SourceItem {
    let decl = RecordDecl {
        name: name.to_string(),
        fields,
    };
    SourceItem::Declaration(if kw == "union" {
        Declaration::Union(decl)
    } else {
        Declaration::Struct(decl)
    })
}

fn position(toks: &[String], token: &str) -> Option<usize> {
    toks.iter().position(|t| t == token)
}

/// Index of the bracket closing the one at `open`.
fn matching(toks: &[String], open: usize) -> Option<usize> {
    let (opener, closer) = match toks.get(open)?.as_str() {
        "(" => ("(", ")"),
        "{" => ("{", "}"),
        "[" => ("[", "]"),
        _ => return None,
    };
    let mut depth = 0usize;
    for (i, t) in toks.iter().enumerate().skip(open) {
        if t == opener {
            depth += 1;
        } else if t == closer {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split at `sep` tokens that are not nested in any bracket.
fn split_top_level<'t>(toks: &'t [String], sep: &str) -> Vec<&'t [String]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, t) in toks.iter().enumerate() {
        match t.as_str() {
            "(" | "{" | "[" => depth += 1,
            ")" | "}" | "]" => depth = depth.saturating_sub(1),
            _ if t == sep && depth == 0 => {
                parts.push(&toks[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&toks[start..]);
    parts
}

/// Normalized type spelling: qualifier first, words space-separated, stars
/// attached to the base.
fn spelling(toks: &[String]) -> String {
    let is_const = toks.iter().any(|t| t == "const");
    let words: Vec<&str> = toks
        .iter()
        .map(String::as_str)
        .filter(|t| is_word(t) && !matches!(*t, "const" | "volatile" | "struct" | "union" | "enum"))
        .collect();
    let stars = toks.iter().filter(|t| *t == "*").count();
    let mut out = String::new();
    if is_const {
        out.push_str("const ");
    }
    out.push_str(&words.join(" "));
    out.push_str(&"*".repeat(stars));
    out
}

fn with_array(spelling: String, array: Option<String>) -> String {
    match array {
        Some(size) => format!("{spelling}[{size}]"),
        None => spelling,
    }
}

fn enum_value(toks: &[String]) -> EnumValue {
    let joined: String = toks.concat();
    match parse_int_literal(&joined) {
        Some(v) => EnumValue::Int(v),
        None => EnumValue::Expr(toks.join(" ")),
    }
}

/// Parse a C integer literal with optional sign, radix prefix and suffixes.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let body = body.trim_end_matches(['u', 'U', 'l', 'L']);
    if body.is_empty() {
        return None;
    }
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        i64::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<i64>().ok()?
    };
    Some(if negative { -value } else { value })
}
