//! Block tree for the declarative configuration language.
//!
//! A parsed document is an ordered list of blocks; a block body is one
//! ordered sequence of attributes and nested blocks so that interleaving
//! survives a parse/serialize round trip. Expressions are never evaluated:
//! anything the engine does not need to look inside stays an opaque
//! [`Expr::Raw`] token run and is copied verbatim.

/// A whole configuration document: ordered top-level blocks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Find the first top-level `resource` block with the given type and name.
    pub fn resource(&self, kind: &str, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| {
            b.block_type == "resource"
                && b.labels.len() == 2
                && b.labels[0] == kind
                && b.labels[1] == name
        })
    }
}

/// A typed, optionally labeled configuration unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub block_type: String,
    pub labels: Vec<String>,
    pub body: Body,
}

impl Block {
    pub fn new(block_type: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            block_type: block_type.into(),
            labels,
            body: Body::default(),
        }
    }

    /// `type.name` address for a resource block, unquoted.
    pub fn address(&self) -> String {
        match self.labels.as_slice() {
            [kind, name, ..] => format!("{}.{}", kind, name),
            [kind] => format!("{}.{}", self.block_type, kind),
            [] => self.block_type.clone(),
        }
    }

    pub fn is_resource(&self) -> bool {
        self.block_type == "resource" && self.labels.len() == 2
    }
}

/// One entry in a block body, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Attr(Attribute),
    Block(Block),
}

/// Ordered block body: attributes and nested blocks, labels may repeat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub items: Vec<BodyItem>,
}

impl Body {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.items.iter().find_map(|it| match it {
            BodyItem::Attr(a) if a.name == name => Some(a),
            _ => None,
        })
    }

    pub fn attr_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.items.iter_mut().find_map(|it| match it {
            BodyItem::Attr(a) if a.name == name => Some(a),
            _ => None,
        })
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Append or overwrite an attribute, keeping its position when it exists.
    pub fn set_attr(&mut self, name: impl Into<String>, expr: Expr) {
        let name = name.into();
        match self.attr_mut(&name) {
            Some(a) => a.expr = expr,
            None => self.items.push(BodyItem::Attr(Attribute { name, expr })),
        }
    }

    pub fn insert_attr_at(&mut self, index: usize, name: impl Into<String>, expr: Expr) {
        self.items.insert(
            index,
            BodyItem::Attr(Attribute {
                name: name.into(),
                expr,
            }),
        );
    }

    /// Remove an attribute by name, returning its expression.
    pub fn remove_attr(&mut self, name: &str) -> Option<Expr> {
        let idx = self.items.iter().position(
            |it| matches!(it, BodyItem::Attr(a) if a.name == name),
        )?;
        match self.items.remove(idx) {
            BodyItem::Attr(a) => Some(a.expr),
            BodyItem::Block(_) => unreachable!(),
        }
    }

    /// All nested blocks with the given type label, in source order.
    pub fn blocks(&self, block_type: &str) -> Vec<&Block> {
        self.items
            .iter()
            .filter_map(|it| match it {
                BodyItem::Block(b) if b.block_type == block_type => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn nested_blocks(&self) -> impl Iterator<Item = &Block> {
        self.items.iter().filter_map(|it| match it {
            BodyItem::Block(b) => Some(b),
            _ => None,
        })
    }

    /// Index of the first nested block with the given type label.
    pub fn block_index(&self, block_type: &str) -> Option<usize> {
        self.items.iter().position(
            |it| matches!(it, BodyItem::Block(b) if b.block_type == block_type),
        )
    }

    /// Detach every nested block with the given type label, in source order.
    pub fn remove_blocks(&mut self, block_type: &str) -> Vec<Block> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            match item {
                BodyItem::Block(b) if b.block_type == block_type => removed.push(b),
                other => kept.push(other),
            }
        }
        self.items = kept;
        removed
    }
}

/// A named attribute with its unevaluated expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub expr: Expr,
}

/// An unevaluated expression.
///
/// Only the shapes the rewrite primitives must look inside get structure;
/// everything else (references, function calls, arithmetic, heredoc-free
/// token runs) is carried as `Raw` text and reprinted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Opaque token run, printed verbatim.
    Raw(String),
    /// Quoted string literal; the stored text is the content between the
    /// quotes, escapes and interpolations included.
    Str(String),
    /// `[ ... ]`
    Array(Vec<Expr>),
    /// `{ key = value, ... }`; keys keep their printed form (identifier or
    /// quoted string).
    Object(Vec<(String, Expr)>),
    /// Array comprehension produced by dynamic-block lowering:
    /// `[for <var> in <collection> : <body>]`.
    ForArray {
        var: String,
        collection: String,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn raw(s: impl Into<String>) -> Self {
        Expr::Raw(s.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expr::Str(s.into())
    }

    /// True only for a quoted string literal.
    pub fn is_literal_string(&self) -> bool {
        matches!(self, Expr::Str(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Expr::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Quote an identifier-or-literal for use as an object key.
pub fn quoted_key(literal: &str) -> String {
    format!("\"{}\"", literal)
}
