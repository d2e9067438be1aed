//! Config-side structural primitives.
//!
//! Every operation here is idempotent (reapplying to already-migrated input
//! is a no-op) and a no-op when its target is absent, so per-resource
//! migrators can compose them without guarding.

use crate::ast::{quoted_key, Attribute, Block, Body, BodyItem, Expr};
use crate::fmt::inline_expr;
use crate::migrator::MovedBlock;
use crate::parser::expr_from_str;

/// Lower a single-occurrence nested block into an object attribute of the
/// same name, recursively lowering the block's own nested blocks. No-op if
/// the attribute already exists or no such block occurs exactly once.
pub fn convert_blocks_to_attribute(body: &mut Body, name: &str) {
    if body.has_attr(name) {
        return;
    }
    let Some(idx) = body.block_index(name) else {
        return;
    };
    let occurrences = body.blocks(name);
    if occurrences.len() != 1 {
        return;
    }
    let obj = build_object_from_block(occurrences[0]);
    body.remove_blocks(name);
    body.insert_attr_at(idx, name, obj);
}

/// Pure bottom-up object construction from a block body.
///
/// Attribute expressions copy verbatim; a nested label occurring once lowers
/// to a nested object entry, a label occurring N>1 times collapses to one
/// entry holding an ordered array of per-occurrence objects.
pub fn build_object_from_block(block: &Block) -> Expr {
    let mut entries: Vec<(String, Expr)> = Vec::new();
    let mut collapsed: Vec<&str> = Vec::new();
    for item in &block.body.items {
        match item {
            BodyItem::Attr(a) => entries.push((a.name.clone(), a.expr.clone())),
            BodyItem::Block(b) => {
                if collapsed.contains(&b.block_type.as_str()) {
                    continue;
                }
                collapsed.push(&b.block_type);
                let occurrences = block.body.blocks(&b.block_type);
                let value = if occurrences.len() == 1 {
                    build_object_from_block(occurrences[0])
                } else {
                    Expr::Array(
                        occurrences.iter().map(|o| build_object_from_block(o)).collect(),
                    )
                };
                entries.push((b.block_type.clone(), value));
            }
        }
    }
    Expr::Object(entries)
}

/// Unify a field that may appear as one attribute and/or N repeated legacy
/// blocks into a single array-of-objects attribute.
///
/// Entries whose `key_attr` value is a non-literal expression are emitted
/// before entries with literal values, each group preserving source order.
/// That partition matches the historical output and is kept for
/// compatibility; see DESIGN.md.
pub fn merge_attribute_and_blocks_to_object_array(body: &mut Body, name: &str, key_attr: &str) {
    let blocks = body.blocks(name);
    if blocks.is_empty() {
        return;
    }
    let attr_idx = body
        .items
        .iter()
        .position(|it| matches!(it, BodyItem::Attr(a) if a.name == name));
    let block_idx = body.block_index(name);
    let insert_at = match (attr_idx, block_idx) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => body.items.len(),
    };

    let mut entries: Vec<Expr> = match body.remove_attr(name) {
        Some(Expr::Array(items)) => items,
        Some(other) => vec![other],
        None => Vec::new(),
    };
    entries.extend(
        body.remove_blocks(name)
            .iter()
            .map(build_object_from_block),
    );

    let (dynamic, literal): (Vec<Expr>, Vec<Expr>) = entries
        .into_iter()
        .partition(|e| !entry_key_is_literal(e, key_attr));
    let mut merged = dynamic;
    merged.extend(literal);
    body.insert_attr_at(insert_at, name, Expr::Array(merged));
}

fn entry_key_is_literal(entry: &Expr, key_attr: &str) -> bool {
    match entry {
        Expr::Object(entries) => entries
            .iter()
            .any(|(k, v)| object_key_name(k) == key_attr && v.is_literal_string()),
        _ => false,
    }
}

fn object_key_name(key: &str) -> &str {
    key.trim_matches('"')
}

/// Collapse repeated blocks keyed by a literal discriminator attribute into
/// one object attribute `{ "<key>" = <value>, ... }`.
///
/// Blocks whose discriminator is missing or non-literal cannot be keyed and
/// stay in place; the return value is how many were left behind.
pub fn convert_blocks_to_map(
    body: &mut Body,
    name: &str,
    key_attr: &str,
    value_attr: &str,
) -> usize {
    if body.has_attr(name) {
        return body.blocks(name).len();
    }
    let Some(idx) = body.block_index(name) else {
        return 0;
    };
    let mut entries: Vec<(String, Expr)> = Vec::new();
    let mut remaining = 0usize;
    let mut i = 0;
    while i < body.items.len() {
        let keyed = match &body.items[i] {
            BodyItem::Block(b) if b.block_type == name => {
                let key = b.body.attr(key_attr).and_then(|a| a.expr.as_str());
                match (key, b.body.attr(value_attr)) {
                    (Some(k), Some(v)) => {
                        entries.push((quoted_key(k), v.expr.clone()));
                        true
                    }
                    _ => {
                        remaining += 1;
                        false
                    }
                }
            }
            _ => false,
        };
        if keyed {
            body.items.remove(i);
        } else {
            i += 1;
        }
    }
    if entries.is_empty() {
        return remaining;
    }
    body.insert_attr_at(idx, name, Expr::Object(entries));
    remaining
}

/// Lower a `dynamic "<name>"` block (repeated over a collection, with a
/// default or aliased iteration variable) into a single array-comprehension
/// attribute. Fields of the produced object are ordered alphabetically;
/// nested sub-objects keep encounter order.
pub fn convert_dynamic_block_to_comprehension(body: &mut Body, name: &str) {
    if body.has_attr(name) {
        return;
    }
    let Some(idx) = body.items.iter().position(|it| {
        matches!(it, BodyItem::Block(b)
            if b.block_type == "dynamic" && b.labels.len() == 1 && b.labels[0] == name)
    }) else {
        return;
    };
    let BodyItem::Block(dynamic) = body.items[idx].clone() else {
        return;
    };
    let Some(for_each) = dynamic.body.attr("for_each") else {
        return;
    };
    let collection = inline_expr(&for_each.expr);
    let var = dynamic
        .body
        .attr("iterator")
        .map(|a| match &a.expr {
            Expr::Str(s) => s.clone(),
            other => inline_expr(other),
        })
        .unwrap_or_else(|| name.to_string());
    let Some(content) = dynamic.body.blocks("content").first().copied() else {
        return;
    };
    let mut object = build_object_from_block(content);
    if let Expr::Object(entries) = &mut object {
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
    body.items.remove(idx);
    body.insert_attr_at(
        idx,
        name,
        Expr::ForArray {
            var,
            collection,
            body: Box::new(object),
        },
    );
}

/// Strip a named no-op wrapping function call around an attribute's
/// expression, leaving the inner expression untouched. No-op unless the
/// whole expression is exactly `func( inner )`.
pub fn remove_function_wrapper(body: &mut Body, attr: &str, func: &str) {
    let Some(a) = body.attr_mut(attr) else {
        return;
    };
    let Expr::Raw(text) = &a.expr else {
        return;
    };
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(func) else {
        return;
    };
    let rest = rest.trim_start();
    let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) else {
        return;
    };
    // Reject `f(a) + g(b)` and multi-argument calls: the interior must be
    // one complete expression, so the rewrite can never produce
    // unparseable text like `var.m, "k"`.
    if !is_single_expression(inner) {
        return;
    }
    a.expr = expr_from_str(inner);
}

fn is_single_expression(s: &str) -> bool {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if in_string {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    depth == 0
}

/// Sort a literal array of string literals lexicographically. Strict no-op
/// (output identical to input) when any element is not a string literal.
pub fn sort_string_array_attribute(body: &mut Body, attr: &str) {
    let Some(a) = body.attr_mut(attr) else {
        return;
    };
    let Expr::Array(items) = &mut a.expr else {
        return;
    };
    if !items.iter().all(|e| e.is_literal_string()) {
        return;
    }
    items.sort_by(|a, b| {
        a.as_str()
            .unwrap_or_default()
            .cmp(b.as_str().unwrap_or_default())
    });
}

/// Unwrap a literal one-element array attribute (`[x]` → `x`), the
/// MaxItems:1 attribute form. No-op for any other shape.
pub fn unwrap_singleton_array_attribute(body: &mut Body, attr: &str) {
    let Some(a) = body.attr_mut(attr) else {
        return;
    };
    if let Expr::Array(items) = &a.expr {
        if items.len() == 1 {
            a.expr = items[0].clone();
        }
    }
}

/// Rename an attribute in place. No-op if absent or the new name exists.
pub fn rename_attribute(body: &mut Body, from: &str, to: &str) {
    if body.has_attr(to) {
        return;
    }
    if let Some(a) = body.attr_mut(from) {
        a.name = to.to_string();
    }
}

/// Remove an attribute. No-op when absent.
pub fn remove_attribute(body: &mut Body, name: &str) {
    body.remove_attr(name);
}

/// Remove every nested block with the given type label. No-op when absent.
pub fn remove_block(body: &mut Body, name: &str) {
    body.remove_blocks(name);
}

/// Copy an attribute from one body to another. No-op when absent in the
/// source or already present in the destination.
pub fn copy_attribute(src: &Body, dst: &mut Body, name: &str) {
    if dst.has_attr(name) {
        return;
    }
    if let Some(a) = src.attr(name) {
        dst.items.push(BodyItem::Attr(Attribute {
            name: a.name.clone(),
            expr: a.expr.clone(),
        }));
    }
}

/// Relabel a resource block's type and report the address rename. Returns
/// `None` (and leaves the block alone) when the label is not `from` —
/// notably when it is already `to`.
pub fn rename_resource_type(block: &mut Block, from: &str, to: &str) -> Option<MovedBlock> {
    if !block.is_resource() || block.labels[0] != from {
        return None;
    }
    block.labels[0] = to.to_string();
    let name = &block.labels[1];
    Some(MovedBlock::new(
        format!("{}.{}", from, name),
        format!("{}.{}", to, name),
    ))
}

/// Build a top-level `moved { from = ..; to = .. }` marker block; the
/// addresses are unquoted expressions.
pub fn create_moved_block(from: &str, to: &str) -> Block {
    let mut block = Block::new("moved", Vec::new());
    block.body.set_attr("from", Expr::raw(from));
    block.body.set_attr("to", Expr::raw(to));
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::format_document;
    use crate::parser::parse_document;
    use pretty_assertions::assert_eq;

    fn block_of(src: &str) -> Block {
        parse_document(src).unwrap().blocks.remove(0)
    }

    // ====================================================================
    // Block -> attribute lowering
    // ====================================================================

    #[test]
    fn lowers_single_block_to_object_attribute() {
        let mut block = block_of(
            "resource \"srv\" \"a\" {\n  name = \"x\"\n  disk {\n    size = 20\n    plan = var.plan\n  }\n}\n",
        );
        convert_blocks_to_attribute(&mut block.body, "disk");
        assert!(block.body.blocks("disk").is_empty());
        assert_eq!(
            block.body.attr("disk").unwrap().expr,
            Expr::Object(vec![
                ("size".to_string(), Expr::raw("20")),
                ("plan".to_string(), Expr::raw("var.plan")),
            ])
        );
    }

    #[test]
    fn lowering_is_idempotent() {
        let mut block = block_of(
            "resource \"srv\" \"a\" {\n  disk {\n    size = 20\n  }\n}\n",
        );
        convert_blocks_to_attribute(&mut block.body, "disk");
        let once = block.clone();
        convert_blocks_to_attribute(&mut block.body, "disk");
        assert_eq!(block, once);
        // And a plain no-op when the block never existed.
        convert_blocks_to_attribute(&mut block.body, "nic");
        assert_eq!(block, once);
    }

    #[test]
    fn lowering_keeps_position_among_siblings() {
        let mut block = block_of(
            "resource \"srv\" \"a\" {\n  before = 1\n  disk {\n    size = 20\n  }\n  after = 2\n}\n",
        );
        convert_blocks_to_attribute(&mut block.body, "disk");
        let names: Vec<&str> = block
            .body
            .items
            .iter()
            .map(|it| match it {
                BodyItem::Attr(a) => a.name.as_str(),
                BodyItem::Block(b) => b.block_type.as_str(),
            })
            .collect();
        assert_eq!(names, ["before", "disk", "after"]);
    }

    #[test]
    fn nested_blocks_lower_recursively_to_depth_four() {
        let mut block = block_of(
            "resource \"srv\" \"a\" {\n  a {\n    b {\n      c {\n        d {\n          leaf = 1\n        }\n      }\n    }\n  }\n}\n",
        );
        convert_blocks_to_attribute(&mut block.body, "a");
        let expected = Expr::Object(vec![(
            "b".to_string(),
            Expr::Object(vec![(
                "c".to_string(),
                Expr::Object(vec![(
                    "d".to_string(),
                    Expr::Object(vec![("leaf".to_string(), Expr::raw("1"))]),
                )]),
            )]),
        )]);
        assert_eq!(block.body.attr("a").unwrap().expr, expected);
    }

    #[test]
    fn repeated_blocks_lower_their_nested_singletons() {
        let mut block = block_of(
            "resource \"srv\" \"a\" {\n  outer {\n    rule {\n      port {\n        n = 1\n      }\n    }\n    rule {\n      port {\n        n = 2\n      }\n    }\n  }\n}\n",
        );
        convert_blocks_to_attribute(&mut block.body, "outer");
        let port = |n: &str| {
            Expr::Object(vec![(
                "port".to_string(),
                Expr::Object(vec![("n".to_string(), Expr::raw(n))]),
            )])
        };
        assert_eq!(
            block.body.attr("outer").unwrap().expr,
            Expr::Object(vec![(
                "rule".to_string(),
                Expr::Array(vec![port("1"), port("2")])
            )])
        );
    }

    #[test]
    fn repeated_nested_labels_collapse_to_array() {
        let block = block_of(
            "resource \"srv\" \"a\" {\n  outer {\n    rule {\n      n = 1\n    }\n    rule {\n      n = 2\n    }\n  }\n}\n",
        );
        let obj = build_object_from_block(block.body.blocks("outer")[0]);
        assert_eq!(
            obj,
            Expr::Object(vec![(
                "rule".to_string(),
                Expr::Array(vec![
                    Expr::Object(vec![("n".to_string(), Expr::raw("1"))]),
                    Expr::Object(vec![("n".to_string(), Expr::raw("2"))]),
                ])
            )])
        );
    }

    // ====================================================================
    // Attribute/blocks merge
    // ====================================================================

    #[test]
    fn merge_partitions_dynamic_before_literal() {
        let mut block = block_of(
            "resource \"lb\" \"a\" {\n  rule {\n    host = \"b.com\"\n  }\n  rule {\n    host = var.host\n  }\n  rule {\n    host = \"a.com\"\n  }\n}\n",
        );
        merge_attribute_and_blocks_to_object_array(&mut block.body, "rule", "host");
        assert!(block.body.blocks("rule").is_empty());
        let Expr::Array(items) = &block.body.attr("rule").unwrap().expr else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 3);
        // Dynamic entry first, then literals in source order.
        assert_eq!(
            items[0],
            Expr::Object(vec![("host".to_string(), Expr::raw("var.host"))])
        );
        assert_eq!(
            items[1],
            Expr::Object(vec![("host".to_string(), Expr::str("b.com"))])
        );
        assert_eq!(
            items[2],
            Expr::Object(vec![("host".to_string(), Expr::str("a.com"))])
        );
    }

    #[test]
    fn merge_with_zero_blocks_is_a_no_op() {
        let mut block = block_of("resource \"lb\" \"a\" {\n  name = \"x\"\n}\n");
        let before = block.clone();
        merge_attribute_and_blocks_to_object_array(&mut block.body, "rule", "host");
        assert_eq!(block, before);
        assert!(!block.body.has_attr("rule"));
    }

    #[test]
    fn merge_unifies_existing_attribute_with_blocks() {
        let mut block = block_of(
            "resource \"lb\" \"a\" {\n  rule = [\n    { host = \"z.com\" },\n  ]\n  rule {\n    host = \"a.com\"\n  }\n}\n",
        );
        merge_attribute_and_blocks_to_object_array(&mut block.body, "rule", "host");
        let Expr::Array(items) = &block.body.attr("rule").unwrap().expr else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 2);
        // Both literal: attribute entries keep their lead in source order.
        assert_eq!(
            items[0],
            Expr::Object(vec![("host".to_string(), Expr::str("z.com"))])
        );
    }

    // ====================================================================
    // Blocks -> keyed map (Scenario A shape)
    // ====================================================================

    #[test]
    fn repeated_header_blocks_collapse_to_keyed_map() {
        let src = r#"resource "cdn" "site" {
  header {
    header = "Host"
    values = ["example.com"]
  }
  header {
    header = "X-Custom"
    values = ["v1", "v2"]
  }
}
"#;
        let mut block = block_of(src);
        let leftover = convert_blocks_to_map(&mut block.body, "header", "header", "values");
        assert_eq!(leftover, 0);
        assert!(block.body.blocks("header").is_empty());
        assert_eq!(
            block.body.attr("header").unwrap().expr,
            Expr::Object(vec![
                ("\"Host\"".to_string(), Expr::Array(vec![Expr::str("example.com")])),
                (
                    "\"X-Custom\"".to_string(),
                    Expr::Array(vec![Expr::str("v1"), Expr::str("v2")])
                ),
            ])
        );
    }

    #[test]
    fn non_literal_discriminator_blocks_stay_in_place() {
        let mut block = block_of(
            "resource \"cdn\" \"site\" {\n  header {\n    header = var.name\n    values = [\"v\"]\n  }\n  header {\n    header = \"Host\"\n    values = [\"h\"]\n  }\n}\n",
        );
        let leftover = convert_blocks_to_map(&mut block.body, "header", "header", "values");
        assert_eq!(leftover, 1);
        assert_eq!(block.body.blocks("header").len(), 1);
        assert!(block.body.has_attr("header"));
    }

    #[test]
    fn leftover_blocks_keep_their_position_among_siblings() {
        let mut block = block_of(
            "resource \"cdn\" \"site\" {\n  a = 1\n  header {\n    header = \"Host\"\n    values = [\"h\"]\n  }\n  b = 2\n  header {\n    header = var.name\n    values = [\"v\"]\n  }\n  c = 3\n}\n",
        );
        let leftover = convert_blocks_to_map(&mut block.body, "header", "header", "values");
        assert_eq!(leftover, 1);
        let shape: Vec<(&str, bool)> = block
            .body
            .items
            .iter()
            .map(|it| match it {
                BodyItem::Attr(a) => (a.name.as_str(), false),
                BodyItem::Block(b) => (b.block_type.as_str(), true),
            })
            .collect();
        // The unkeyable block stays between b and c, where it was written.
        assert_eq!(
            shape,
            [
                ("a", false),
                ("header", false),
                ("b", false),
                ("header", true),
                ("c", false),
            ]
        );
    }

    // ====================================================================
    // Dynamic block lowering
    // ====================================================================

    #[test]
    fn dynamic_block_lowers_to_comprehension() {
        let src = r#"resource "cdn" "site" {
  dynamic "header" {
    for_each = var.headers
    content {
      zeta = header.value.z
      alpha = header.value.a
      inner {
        z = 1
        a = 2
      }
    }
  }
}
"#;
        let mut block = block_of(src);
        convert_dynamic_block_to_comprehension(&mut block.body, "header");
        let expr = &block.body.attr("header").unwrap().expr;
        let Expr::ForArray { var, collection, body } = expr else {
            panic!("expected comprehension, got {expr:?}");
        };
        assert_eq!(var, "header");
        assert_eq!(collection, "var.headers");
        // Top-level fields alphabetical; nested object keeps encounter order.
        let Expr::Object(entries) = body.as_ref() else {
            panic!("expected object body");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["alpha", "inner", "zeta"]);
        let Expr::Object(inner) = &entries[1].1 else {
            panic!("expected nested object");
        };
        let inner_keys: Vec<&str> = inner.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(inner_keys, ["z", "a"]);
    }

    #[test]
    fn dynamic_block_honors_iterator_alias() {
        let src = "resource \"cdn\" \"site\" {\n  dynamic \"header\" {\n    for_each = var.headers\n    iterator = h\n    content {\n      name = h.value.name\n    }\n  }\n}\n";
        let mut block = block_of(src);
        convert_dynamic_block_to_comprehension(&mut block.body, "header");
        let Expr::ForArray { var, .. } = &block.body.attr("header").unwrap().expr else {
            panic!("expected comprehension");
        };
        assert_eq!(var, "h");
    }

    // ====================================================================
    // Smaller primitives
    // ====================================================================

    #[test]
    fn function_wrapper_is_stripped() {
        let mut block = block_of("resource \"a\" \"b\" {\n  v = toset([\"y\", \"x\"])\n}\n");
        remove_function_wrapper(&mut block.body, "v", "toset");
        assert_eq!(
            block.body.attr("v").unwrap().expr,
            Expr::Array(vec![Expr::str("y"), Expr::str("x")])
        );
    }

    #[test]
    fn wrapper_strip_rejects_adjacent_calls() {
        let mut block = block_of("resource \"a\" \"b\" {\n  v = toset(var.a) == toset(var.b)\n}\n");
        let before = block.clone();
        remove_function_wrapper(&mut block.body, "v", "toset");
        assert_eq!(block, before);
    }

    #[test]
    fn wrapper_strip_rejects_multi_argument_calls() {
        let mut block = block_of("resource \"a\" \"b\" {\n  v = lookup(var.m, \"k\")\n}\n");
        let before = block.clone();
        remove_function_wrapper(&mut block.body, "v", "lookup");
        assert_eq!(block, before);

        // A comma inside a nested call is still one argument.
        let mut nested = block_of("resource \"a\" \"b\" {\n  v = toset(concat(var.a, var.b))\n}\n");
        remove_function_wrapper(&mut nested.body, "v", "toset");
        assert_eq!(
            nested.body.attr("v").unwrap().expr,
            Expr::raw("concat(var.a, var.b)")
        );
    }

    #[test]
    fn sorts_literal_string_arrays_only() {
        let mut block = block_of("resource \"a\" \"b\" {\n  v = [\"c\", \"a\", \"b\"]\n}\n");
        sort_string_array_attribute(&mut block.body, "v");
        assert_eq!(
            block.body.attr("v").unwrap().expr,
            Expr::Array(vec![Expr::str("a"), Expr::str("b"), Expr::str("c")])
        );

        // Any non-literal element makes the sort a strict no-op.
        let mut mixed = block_of("resource \"a\" \"b\" {\n  v = [\"c\", var.x, \"a\"]\n}\n");
        let before = mixed.clone();
        sort_string_array_attribute(&mut mixed.body, "v");
        assert_eq!(mixed, before);
    }

    #[test]
    fn unwraps_singleton_literal_array() {
        let mut block = block_of("resource \"a\" \"b\" {\n  v = [\"only\"]\n}\n");
        unwrap_singleton_array_attribute(&mut block.body, "v");
        assert_eq!(block.body.attr("v").unwrap().expr, Expr::str("only"));
        // Idempotent.
        unwrap_singleton_array_attribute(&mut block.body, "v");
        assert_eq!(block.body.attr("v").unwrap().expr, Expr::str("only"));
    }

    #[test]
    fn rename_and_copy_are_no_ops_when_target_absent_or_taken() {
        let mut block = block_of("resource \"a\" \"b\" {\n  old = 1\n  both = 2\n}\n");
        rename_attribute(&mut block.body, "old", "new");
        assert!(block.body.has_attr("new") && !block.body.has_attr("old"));
        rename_attribute(&mut block.body, "missing", "other");
        assert!(!block.body.has_attr("other"));
        rename_attribute(&mut block.body, "new", "both");
        assert!(block.body.has_attr("new"));

        let src_body = block.body.clone();
        let mut dst = Body::default();
        copy_attribute(&src_body, &mut dst, "new");
        copy_attribute(&src_body, &mut dst, "new");
        copy_attribute(&src_body, &mut dst, "missing");
        assert_eq!(dst.items.len(), 1);
    }

    #[test]
    fn resource_type_rename_reports_moved_address() {
        let mut block = block_of("resource \"cdn\" \"site\" {}\n");
        let mv = rename_resource_type(&mut block, "cdn", "cdn_v2").unwrap();
        assert_eq!(mv, MovedBlock::new("cdn.site", "cdn_v2.site"));
        assert_eq!(block.labels[0], "cdn_v2");
        // Already renamed: no second moved pair.
        assert!(rename_resource_type(&mut block, "cdn", "cdn_v2").is_none());
    }

    #[test]
    fn moved_block_serializes_with_unquoted_addresses() {
        let moved = create_moved_block("cdn.site", "cdn_v2.site");
        let doc = crate::ast::Document { blocks: vec![moved] };
        let text = format_document(&doc).unwrap();
        assert_eq!(text, "moved {\n  from = cdn.site\n  to   = cdn_v2.site\n}\n");
    }
}
