use crate::analyzers::preorder;
use crate::core::RawMetrics;
use tree_sitter::Node;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Code,
    Blank,
    Comment,
    Docstring,
}

/// Classify every physical line. A docstring line is never counted as blank
/// or comment, and a line holding code plus a trailing comment is code.
pub fn raw_metrics(root: Node, source: &str) -> RawMetrics {
    let lines: Vec<&str> = source.lines().collect();
    let mut kinds: Vec<LineKind> = lines
        .iter()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                LineKind::Blank
            } else {
                LineKind::Code
            }
        })
        .collect();

    for node in preorder(root) {
        match node.kind() {
            "comment" => {
                let row = node.start_position().row;
                if let Some(kind) = kinds.get_mut(row) {
                    if lines[row].trim_start().starts_with('#') {
                        *kind = LineKind::Comment;
                    }
                }
            }
            "module" | "block" if holds_docstrings(node) => {
                if let Some(doc) = docstring(node) {
                    let start = doc.start_position();
                    let end = doc.end_position().row.min(kinds.len().saturating_sub(1));
                    for row in start.row..=end {
                        // `def f(): """doc"""` keeps its row as code
                        if row == start.row && indent(lines[row]) != start.column {
                            continue;
                        }
                        kinds[row] = LineKind::Docstring;
                    }
                }
            }
            _ => {}
        }
    }

    let count = |wanted: LineKind| kinds.iter().filter(|k| **k == wanted).count();
    RawMetrics {
        total_lines: lines.len(),
        sloc: count(LineKind::Code),
        comment_lines: count(LineKind::Comment),
        docstring_lines: count(LineKind::Docstring),
        blank_lines: count(LineKind::Blank),
    }
}

/// Byte width of the leading whitespace
fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn holds_docstrings(container: Node) -> bool {
    container.kind() == "module"
        || container
            .parent()
            .is_some_and(|p| matches!(p.kind(), "function_definition" | "class_definition"))
}

/// The leading bare string statement of a module, class or function body
fn docstring(container: Node) -> Option<Node> {
    let mut cursor = container.walk();
    let first = container
        .named_children(&mut cursor)
        .find(|c| c.kind() != "comment")?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    first
        .named_child(0)
        .filter(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
}
