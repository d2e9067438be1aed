//! Empty-value nullification.
//!
//! The old API returns concrete defaults for unset optional fields, while
//! the new schema treats "unset" as `null`; leaving the zero values behind
//! causes spurious plan diffs on the very next run. A state field is
//! rewritten to `null` only when it holds its type's zero value AND the
//! corresponding attribute is not explicitly present in the rewritten
//! configuration — a config-present field keeps its literal value even when
//! that value is the zero value.
//!
//! State and config trees are not structurally identical (a repeated state
//! block may correspond to a single config array attribute), so the
//! correspondence is an explicit per-resource path table rather than an
//! inferred one.

use serde_json::Value;

use crate::ast::{Body, Expr};

use super::edit::with_field;

/// Per-resource table mapping state JSON paths to config attribute paths.
#[derive(Debug, Clone, Default)]
pub struct PathMap {
    entries: Vec<(String, String)>,
}

impl PathMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state-path → config-path pair (builder style).
    pub fn map(mut self, state_path: impl Into<String>, config_path: impl Into<String>) -> Self {
        self.entries.push((state_path.into(), config_path.into()));
        self
    }

    /// A field whose state and config paths coincide.
    pub fn same(self, path: &str) -> Self {
        self.map(path, path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, c)| (s.as_str(), c.as_str()))
    }
}

/// Nullify every mapped state field that is zero-valued and absent from the
/// configuration. `config` is the rewritten config body for this resource;
/// `None` means the resource has no config block at all, so every mapped
/// zero value nullifies.
pub fn transform_empty_values_to_null(attrs: &mut Value, config: Option<&Body>, map: &PathMap) {
    for (state_path, config_path) in map.iter() {
        let present = match config {
            Some(body) => {
                let segments: Vec<&str> = config_path.split('.').collect();
                body_has_path(body, &segments)
            }
            None => false,
        };
        if present {
            continue;
        }
        with_field(attrs, state_path, &mut |parent, field| {
            if let Some(value) = parent.get_mut(field) {
                if is_zero_value(value) {
                    *value = Value::Null;
                }
            }
        });
    }
}

/// The type's zero value: empty string, empty array, empty object, `false`,
/// or numeric zero. `null` itself is not a zero value.
pub fn is_zero_value(value: &Value) -> bool {
    match value {
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Null => false,
    }
}

/// Whether a dotted attribute path is explicitly present in a config body.
/// Walks attributes, object-expression keys and nested block labels; array
/// elements are searched for any match.
fn body_has_path(body: &Body, segments: &[&str]) -> bool {
    let head = segments[0];
    if let Some(attr) = body.attr(head) {
        if segments.len() == 1 {
            return true;
        }
        if expr_has_path(&attr.expr, &segments[1..]) {
            return true;
        }
    }
    for block in body.blocks(head) {
        if segments.len() == 1 || body_has_path(&block.body, &segments[1..]) {
            return true;
        }
    }
    false
}

fn expr_has_path(expr: &Expr, segments: &[&str]) -> bool {
    match expr {
        Expr::Object(entries) => entries.iter().any(|(key, value)| {
            key.trim_matches('"') == segments[0]
                && (segments.len() == 1 || expr_has_path(value, &segments[1..]))
        }),
        Expr::Array(items) => items.iter().any(|item| expr_has_path(item, segments)),
        Expr::ForArray { body, .. } => expr_has_path(body, segments),
        // An opaque expression may populate anything beneath it; treat the
        // path as present so the literal state value is left alone.
        Expr::Raw(_) => true,
        Expr::Str(_) => false,
    }
}
