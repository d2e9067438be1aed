//! Canonical serializer for the block tree.
//!
//! Output layout is owned entirely by the formatter: two-space indentation,
//! `=` alignment within contiguous attribute runs, one blank line between
//! top-level blocks. Running parse → format → parse → format yields
//! identical text, which keeps post-migration diffs minimal.

use std::fmt::{Result, Write};

use crate::ast::{Block, Body, BodyItem, Document, Expr};

pub struct Formatter {
    indent_level: usize,
    buffer: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            buffer: String::new(),
        }
    }

    pub fn format(mut self, doc: &Document) -> std::result::Result<String, std::fmt::Error> {
        for (i, block) in doc.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(self.buffer)?;
            }
            self.visit_block(block)?;
        }
        Ok(self.buffer)
    }

    fn indent(&mut self) -> Result {
        for _ in 0..self.indent_level {
            write!(self.buffer, "  ")?;
        }
        Ok(())
    }

    fn visit_block(&mut self, block: &Block) -> Result {
        self.indent()?;
        write!(self.buffer, "{}", block.block_type)?;
        for label in &block.labels {
            write!(self.buffer, " \"{}\"", label)?;
        }
        if block.body.is_empty() {
            writeln!(self.buffer, " {{}}")?;
            return Ok(());
        }
        writeln!(self.buffer, " {{")?;
        self.indent_level += 1;
        self.visit_body(&block.body)?;
        self.indent_level -= 1;
        self.indent()?;
        writeln!(self.buffer, "}}")?;
        Ok(())
    }

    /// Attribute runs are aligned on `=` per contiguous group; a nested
    /// block ends the group.
    fn visit_body(&mut self, body: &Body) -> Result {
        let mut i = 0;
        while i < body.items.len() {
            match &body.items[i] {
                BodyItem::Block(b) => {
                    self.visit_block(b)?;
                    i += 1;
                }
                BodyItem::Attr(_) => {
                    let mut end = i;
                    while end < body.items.len() {
                        if !matches!(body.items[end], BodyItem::Attr(_)) {
                            break;
                        }
                        end += 1;
                    }
                    let width = body.items[i..end]
                        .iter()
                        .map(|it| match it {
                            BodyItem::Attr(a) => a.name.len(),
                            BodyItem::Block(_) => 0,
                        })
                        .max()
                        .unwrap_or(0);
                    for it in &body.items[i..end] {
                        if let BodyItem::Attr(a) = it {
                            self.indent()?;
                            write!(self.buffer, "{:width$} = ", a.name, width = width)?;
                            self.visit_expr(&a.expr)?;
                            writeln!(self.buffer)?;
                        }
                    }
                    i = end;
                }
            }
        }
        Ok(())
    }

    fn visit_expr(&mut self, expr: &Expr) -> Result {
        match expr {
            Expr::Raw(s) => write!(self.buffer, "{}", s)?,
            Expr::Str(s) => write!(self.buffer, "\"{}\"", s)?,
            Expr::Array(items) => {
                if items.is_empty() {
                    write!(self.buffer, "[]")?;
                } else if items.iter().any(|e| matches!(e, Expr::Object(_))) {
                    writeln!(self.buffer, "[")?;
                    self.indent_level += 1;
                    for item in items {
                        self.indent()?;
                        self.visit_expr(item)?;
                        writeln!(self.buffer, ",")?;
                    }
                    self.indent_level -= 1;
                    self.indent()?;
                    write!(self.buffer, "]")?;
                } else {
                    write!(self.buffer, "[")?;
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            write!(self.buffer, ", ")?;
                        }
                        self.visit_expr(item)?;
                    }
                    write!(self.buffer, "]")?;
                }
            }
            Expr::Object(entries) => {
                if entries.is_empty() {
                    write!(self.buffer, "{{}}")?;
                    return Ok(());
                }
                writeln!(self.buffer, "{{")?;
                self.indent_level += 1;
                let width = entries.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
                for (key, value) in entries {
                    self.indent()?;
                    write!(self.buffer, "{:width$} = ", key, width = width)?;
                    self.visit_expr(value)?;
                    writeln!(self.buffer)?;
                }
                self.indent_level -= 1;
                self.indent()?;
                write!(self.buffer, "}}")?;
            }
            Expr::ForArray {
                var,
                collection,
                body,
            } => {
                write!(self.buffer, "[for {} in {} : ", var, collection)?;
                write!(self.buffer, "{}", inline_expr(body))?;
                write!(self.buffer, "]")?;
            }
        }
        Ok(())
    }
}

/// Serialize a whole document canonically.
pub fn format_document(doc: &Document) -> std::result::Result<String, std::fmt::Error> {
    Formatter::new().format(doc)
}

/// Single-line rendering of an expression, used inside comprehensions and
/// wherever a primitive needs expression text (e.g. a `for_each` collection).
pub fn inline_expr(expr: &Expr) -> String {
    match expr {
        Expr::Raw(s) => s.clone(),
        Expr::Str(s) => format!("\"{}\"", s),
        Expr::Array(items) => {
            let inner: Vec<String> = items.iter().map(inline_expr).collect();
            format!("[{}]", inner.join(", "))
        }
        Expr::Object(entries) => {
            if entries.is_empty() {
                return "{}".to_string();
            }
            let inner: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("{} = {}", k, inline_expr(v)))
                .collect();
            format!("{{ {} }}", inner.join(", "))
        }
        Expr::ForArray {
            var,
            collection,
            body,
        } => format!("[for {} in {} : {}]", var, collection, inline_expr(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_contiguous_attributes() {
        let doc = parse_document("resource \"a\" \"b\" {\nname = 1\nlong_name = 2\n}\n")
            .unwrap();
        let out = format_document(&doc).unwrap();
        assert_eq!(
            out,
            "resource \"a\" \"b\" {\n  name      = 1\n  long_name = 2\n}\n"
        );
    }

    #[test]
    fn format_is_stable_under_reparse() {
        let src = r#"
resource "cdn" "site" {
  enabled = true
  header {
    header = "Host"
    values = ["example.com", var.extra]
  }
  tags = { "team" = "infra", env = var.env }
}

moved {
  from = cdn.site
  to   = cdn_v2.site
}
"#;
        let once = format_document(&parse_document(src).unwrap()).unwrap();
        let twice = format_document(&parse_document(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn comprehension_round_trips() {
        let doc = parse_document(
            "resource \"a\" \"b\" {\n  header = [for h in var.headers : { name = h.name }]\n}\n",
        )
        .unwrap();
        let once = format_document(&doc).unwrap();
        let twice = format_document(&parse_document(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }
}
