//! Parser for the block-oriented configuration language.
//!
//! The whole document is parsed once into the [`crate::ast`] block tree;
//! a parse failure is fatal for the document (no partial output). Comments
//! (`#`, `//`, `/* */`) are accepted and dropped; the canonical formatter
//! owns all output layout.

pub mod expr;


use nom::{
    bytes::complete::take_while1,
    IResult,
};

use crate::ast::{Attribute, Block, Body, BodyItem, Document};
use crate::error::MigrateError;

pub use expr::{expr_from_str, parse_expr};

/// Parse a full document. Any syntax error is fatal and reported with its
/// line and column.
pub fn parse_document(src: &str) -> Result<Document, MigrateError> {
    let mut rest = skip_trivia(src);
    let mut blocks = Vec::new();
    while !rest.is_empty() {
        match parse_block(rest) {
            Ok((r, block)) => {
                blocks.push(block);
                rest = skip_trivia(r);
            }
            Err(e) => {
                let at = match &e {
                    nom::Err::Error(e) | nom::Err::Failure(e) => e.input,
                    nom::Err::Incomplete(_) => "",
                };
                let (line, column) = position(src, at);
                return Err(MigrateError::parse(line, column, "malformed block"));
            }
        }
    }
    Ok(Document { blocks })
}

/// Line/column (1-based) of the remaining-input slice within the source.
fn position(src: &str, rest: &str) -> (usize, usize) {
    let offset = src.len().saturating_sub(rest.len());
    let consumed = &src[..offset.min(src.len())];
    let line = consumed.matches('\n').count() + 1;
    let column = consumed
        .rsplit_once('\n')
        .map(|(_, tail)| tail.len())
        .unwrap_or(consumed.len())
        + 1;
    (line, column)
}

/// Parse an identifier (block type, label, attribute name).
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-')(input)
}

/// `type "label" "label" { body }`; labels are optional and may be quoted
/// or bare.
fn parse_block(input: &str) -> IResult<&str, Block> {
    let (rest, block_type) = parse_identifier(input)?;
    let mut rest = skip_inline_ws(rest);
    let mut labels = Vec::new();
    loop {
        if rest.starts_with('"') {
            let (r, label) = expr::parse_string_literal(rest)?;
            labels.push(label);
            rest = skip_inline_ws(r);
        } else if rest.starts_with('{') {
            break;
        } else if let Ok((r, label)) = parse_identifier(rest) {
            labels.push(label.to_string());
            rest = skip_inline_ws(r);
        } else {
            return fail(rest);
        }
    }
    let (rest, body) = parse_body(&rest[1..])?;
    Ok((
        rest,
        Block {
            block_type: block_type.to_string(),
            labels,
            body,
        },
    ))
}

/// Body items until the closing `}`: attributes (`name = expr`) and nested
/// blocks, in source order.
fn parse_body(input: &str) -> IResult<&str, Body> {
    let mut rest = skip_trivia(input);
    let mut items = Vec::new();
    loop {
        if let Some(r) = rest.strip_prefix('}') {
            return Ok((r, Body { items }));
        }
        if rest.is_empty() {
            return fail(rest);
        }
        let (r, name) = parse_identifier(rest)?;
        let r2 = skip_inline_ws(r);
        if let Some(r3) = r2.strip_prefix('=') {
            let (r4, expr) = expr::parse_expr(r3)?;
            items.push(BodyItem::Attr(Attribute {
                name: name.to_string(),
                expr,
            }));
            rest = skip_trivia(r4);
        } else {
            // Nested block: re-parse from the type identifier.
            let (r3, block) = parse_block(rest)?;
            items.push(BodyItem::Block(block));
            rest = skip_trivia(r3);
        }
    }
}

/// Skip spaces and tabs only.
pub(crate) fn skip_inline_ws(input: &str) -> &str {
    input.trim_start_matches([' ', '\t'])
}

/// Skip whitespace (including newlines) and comments.
pub(crate) fn skip_trivia(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start();
        if let Some(rest) = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("//"))
        {
            input = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            input = rest.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            return trimmed;
        }
    }
}

fn fail<T>(input: &str) -> IResult<&str, T> {
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Fail,
    )))
}
