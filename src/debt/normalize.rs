//! Token normalization for near-duplicate detection.
//!
//! A function body becomes the sequence of its leaf tokens with comments
//! dropped. The function's own name becomes `$fn` and every parameter or
//! locally bound name is renamed to `$0`, `$1`, ... in order of first
//! occurrence, so two bodies that differ only in local naming normalize to
//! the same sequence. Globals, attributes and keyword-argument names are
//! kept verbatim.

use crate::analyzers::{node_text, preorder};
use crate::core::FunctionRecord;
use std::collections::{HashMap, HashSet};
use tree_sitter::Node;

pub const FUNCTION_NAME_TOKEN: &str = "$fn";

pub fn normalized_tokens(def: Node, record: &FunctionRecord, source: &str) -> Vec<String> {
    let name_node = def.child_by_field_name("name");
    let mut bound: HashSet<&str> = record.parameters.iter().map(String::as_str).collect();
    if let Some(body) = def.child_by_field_name("body") {
        collect_local_bindings(body, source, &mut bound);
    }

    let mut renames: HashMap<&str, String> = HashMap::new();
    let mut tokens = Vec::new();

    for node in preorder(def) {
        if node.child_count() > 0 || node.kind() == "comment" {
            continue;
        }
        if node.is_missing() {
            continue;
        }
        let text = node_text(node, source);
        if text.is_empty() {
            continue;
        }

        if Some(node) == name_node {
            tokens.push(FUNCTION_NAME_TOKEN.to_string());
        } else if node.kind() == "identifier" && bound.contains(text) && !is_member_name(node) {
            let next = renames.len();
            let renamed = renames.entry(text).or_insert_with(|| format!("${next}"));
            tokens.push(renamed.clone());
        } else {
            tokens.push(text.to_string());
        }
    }

    tokens
}

/// `attr` in `obj.attr` and `name` in `f(name=...)` are not variables
fn is_member_name(identifier: Node) -> bool {
    let Some(parent) = identifier.parent() else {
        return false;
    };
    let field = match parent.kind() {
        "attribute" => "attribute",
        "keyword_argument" => "name",
        _ => return false,
    };
    parent.child_by_field_name(field) == Some(identifier)
}

fn collect_local_bindings<'a>(body: Node, source: &'a str, bound: &mut HashSet<&'a str>) {
    for node in preorder(body) {
        let target = match node.kind() {
            "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                node.child_by_field_name("left")
            }
            "named_expression" => node.child_by_field_name("name"),
            "as_pattern_target" => Some(node),
            _ => None,
        };
        if let Some(target) = target {
            bind_target(target, source, bound);
        }
    }
}

fn bind_target<'a>(target: Node, source: &'a str, bound: &mut HashSet<&'a str>) {
    match target.kind() {
        "identifier" => {
            bound.insert(node_text(target, source));
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern"
        | "as_pattern_target" | "parenthesized_expression" | "tuple" | "list" => {
            let mut cursor = target.walk();
            let children: Vec<Node> = target.named_children(&mut cursor).collect();
            for child in children {
                bind_target(child, source, bound);
            }
        }
        _ => {}
    }
}
