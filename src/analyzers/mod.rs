use crate::core::{FunctionRecord, Result, SourceUnit};
use tree_sitter::Node;

pub mod python;
pub mod python_ast_extraction;
pub mod raw;

pub use python::PythonAnalyzer;

/// Parse `source` into a [`SourceUnit`]. All-or-nothing: either the whole
/// model is built or a `SyntaxError` is returned.
pub fn build_source_unit(source: &str) -> Result<SourceUnit> {
    PythonAnalyzer::new()?.parse(source)
}

/// Text covered by `node`, empty if the range is not valid UTF-8
pub(crate) fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// 1-based line of the node's first byte
pub(crate) fn start_line(node: Node) -> usize {
    node.start_position().row + 1
}

/// 1-based line of the node's last byte
pub(crate) fn end_line(node: Node) -> usize {
    let end = node.end_position();
    // A node ending at column 0 stops before that row's first byte
    if end.column == 0 && end.row > node.start_position().row {
        end.row
    } else {
        end.row + 1
    }
}

/// The `function_definition` node a record was extracted from
pub(crate) fn function_node<'t>(root: Node<'t>, function: &FunctionRecord) -> Option<Node<'t>> {
    let range = &function.node_range;
    let mut node = root.descendant_for_byte_range(range.start, range.end)?;
    loop {
        if node.kind() == "function_definition" && node.byte_range() == *range {
            return Some(node);
        }
        node = node.parent()?;
    }
}

/// Pre-order walk without recursion, so deeply nested expressions cannot
/// exhaust the stack
pub(crate) fn preorder<'t>(root: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let mut stack = vec![root];
    std::iter::from_fn(move || {
        let node = stack.pop()?;
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
        Some(node)
    })
}
