//! Expression capture.
//!
//! Expressions are never evaluated. Arrays, objects and quoted strings get
//! structure because the rewrite primitives must look inside them; every
//! other token run (references, function calls, conditionals) is scanned
//! with bracket/string awareness and kept as verbatim [`Expr::Raw`] text.

use nom::IResult;

use crate::ast::Expr;

use super::{skip_inline_ws, skip_trivia};

/// Characters that end a raw token run at bracket depth zero.
fn is_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | ',' | ']' | '}' | ')' | '#')
}

/// Parse one expression, structured where possible.
pub fn parse_expr(input: &str) -> IResult<&str, Expr> {
    let input = skip_inline_ws(input);
    let mut chars = input.chars();
    match chars.next() {
        Some('"') => {
            let (rest, inner) = parse_string_literal(input)?;
            if at_expr_end(rest) {
                Ok((rest, Expr::Str(inner)))
            } else {
                // String is only a prefix of a larger expression
                // (e.g. `"a" == var.x ? 1 : 2`); fall back to raw capture.
                parse_raw(input)
            }
        }
        Some('[') => {
            let (rest, exprs) = parse_array(input)?;
            if at_expr_end(rest) {
                Ok((rest, Expr::Array(exprs)))
            } else {
                parse_raw(input)
            }
        }
        Some('{') => {
            let (rest, entries) = parse_object(input)?;
            if at_expr_end(rest) {
                Ok((rest, Expr::Object(entries)))
            } else {
                parse_raw(input)
            }
        }
        _ => parse_raw(input),
    }
}

/// Parse a standalone expression string, e.g. the interior of a stripped
/// function wrapper. Falls back to trimmed raw text when the input does not
/// parse cleanly as a single expression.
pub fn expr_from_str(s: &str) -> Expr {
    let trimmed = s.trim();
    match parse_expr(trimmed) {
        Ok((rest, expr)) if rest.trim().is_empty() => expr,
        _ => Expr::Raw(trimmed.to_string()),
    }
}

/// True when the remaining input starts with something that legally follows
/// a complete expression.
fn at_expr_end(rest: &str) -> bool {
    let rest = skip_inline_ws(rest);
    match rest.chars().next() {
        None => true,
        Some(c) if is_terminator(c) => true,
        Some('/') => rest.starts_with("//"),
        _ => false,
    }
}

/// Quoted string literal; returns the content between the quotes verbatim,
/// escapes and `${}` interpolations included.
pub fn parse_string_literal(input: &str) -> IResult<&str, String> {
    let mut iter = input.char_indices();
    match iter.next() {
        Some((_, '"')) => {}
        _ => return fail(input),
    }
    let mut escaped = false;
    let mut interp_depth = 0usize;
    let mut prev = '"';
    for (idx, c) in iter {
        if escaped {
            escaped = false;
            prev = c;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '{' if prev == '$' => interp_depth += 1,
            '}' if interp_depth > 0 => interp_depth -= 1,
            '"' if interp_depth == 0 => {
                return Ok((&input[idx + 1..], input[1..idx].to_string()));
            }
            _ => {}
        }
        prev = c;
    }
    fail(input)
}

/// `[ expr, expr, ... ]` with optional trailing comma and free-form
/// whitespace/comments between elements.
fn parse_array(input: &str) -> IResult<&str, Vec<Expr>> {
    let mut rest = match input.strip_prefix('[') {
        Some(r) => r,
        None => return fail(input),
    };
    let mut exprs = Vec::new();
    loop {
        rest = skip_trivia(rest);
        if let Some(r) = rest.strip_prefix(']') {
            return Ok((r, exprs));
        }
        let (r, expr) = parse_expr(rest)?;
        exprs.push(expr);
        rest = skip_trivia(r);
        if let Some(r) = rest.strip_prefix(',') {
            rest = r;
        }
    }
}

/// `{ key = expr, ... }`; keys keep their printed form. Accepts both `=`
/// and `:` as the key/value separator, normalizing to `=` on output.
fn parse_object(input: &str) -> IResult<&str, Vec<(String, Expr)>> {
    let mut rest = match input.strip_prefix('{') {
        Some(r) => r,
        None => return fail(input),
    };
    let mut entries = Vec::new();
    loop {
        rest = skip_trivia(rest);
        if let Some(r) = rest.strip_prefix('}') {
            return Ok((r, entries));
        }
        let (r, key) = parse_object_key(rest)?;
        let r = skip_inline_ws(r);
        let r = match r.strip_prefix('=').or_else(|| r.strip_prefix(':')) {
            Some(r) => r,
            None => return fail(r),
        };
        let (r, expr) = parse_expr(r)?;
        entries.push((key, expr));
        rest = skip_trivia(r);
        if let Some(r) = rest.strip_prefix(',') {
            rest = r;
        }
    }
}

fn parse_object_key(input: &str) -> IResult<&str, String> {
    if input.starts_with('"') {
        let (rest, inner) = parse_string_literal(input)?;
        Ok((rest, format!("\"{}\"", inner)))
    } else {
        let end = input
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-' || c == '.'))
            .unwrap_or(input.len());
        if end == 0 {
            return fail(input);
        }
        Ok((&input[end..], input[..end].to_string()))
    }
}

/// Scan a raw token run: consume until a terminator at bracket depth zero,
/// tracking nested brackets and quoted strings so commas and newlines inside
/// them pass through.
fn parse_raw(input: &str) -> IResult<&str, Expr> {
    let mut depth = 0usize;
    let mut end = input.len();
    let mut idx = 0;
    let bytes = input.as_bytes();
    while idx < input.len() {
        let c = bytes[idx] as char;
        match c {
            '"' => {
                let (rest, _) = parse_string_literal(&input[idx..])?;
                idx = input.len() - rest.len();
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                if depth == 0 {
                    end = idx;
                    break;
                }
                depth -= 1;
            }
            '/' if depth == 0 && input[idx..].starts_with("//") => {
                end = idx;
                break;
            }
            _ if depth == 0 && is_terminator(c) => {
                end = idx;
                break;
            }
            _ => {}
        }
        idx += 1;
    }
    let text = input[..end].trim_end();
    if text.is_empty() {
        return fail(input);
    }
    Ok((&input[text.len()..], Expr::Raw(text.to_string())))
}

fn fail<T>(input: &str) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Fail,
    )))
}
