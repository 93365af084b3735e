use crate::analyzers::{node_text, preorder};
use std::collections::HashSet;
use tree_sitter::Node;

/// Operator/operand tallies over the operator expressions of a module
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HalsteadMetrics {
    pub distinct_operators: usize,
    pub distinct_operands: usize,
    pub total_operators: usize,
    pub total_operands: usize,
}

impl HalsteadMetrics {
    pub fn vocabulary(&self) -> usize {
        self.distinct_operators + self.distinct_operands
    }

    pub fn length(&self) -> usize {
        self.total_operators + self.total_operands
    }

    /// `N * log2(n)`, zero when nothing was counted
    pub fn volume(&self) -> f64 {
        let vocabulary = self.vocabulary();
        if vocabulary == 0 {
            return 0.0;
        }
        self.length() as f64 * (vocabulary as f64).log2()
    }
}

#[derive(Default)]
struct Tally<'a> {
    operators: HashSet<&'a str>,
    operands: HashSet<&'a str>,
    total_operators: usize,
    total_operands: usize,
}

impl<'a> Tally<'a> {
    fn operator(&mut self, text: &'a str) {
        self.operators.insert(text);
        self.total_operators += 1;
    }

    fn operand(&mut self, text: &'a str) {
        self.operands.insert(text);
        self.total_operands += 1;
    }
}

/// Counts binary, unary, boolean, `not`, comparison and augmented-assignment
/// expressions. Operands are compared by their source text.
pub fn calculate_halstead<'a>(root: Node, source: &'a str) -> HalsteadMetrics {
    let mut tally = Tally::default();
    let text = |node: Node| -> &'a str { node_text(node, source) };

    for node in preorder(root) {
        match node.kind() {
            "binary_operator" | "boolean_operator" | "augmented_assignment" => {
                if let Some(op) = node.child_by_field_name("operator") {
                    tally.operator(text(op));
                }
                for field in ["left", "right"] {
                    if let Some(operand) = node.child_by_field_name(field) {
                        tally.operand(text(operand));
                    }
                }
            }
            "unary_operator" => {
                if let Some(op) = node.child_by_field_name("operator") {
                    tally.operator(text(op));
                }
                if let Some(argument) = node.child_by_field_name("argument") {
                    tally.operand(text(argument));
                }
            }
            "not_operator" => {
                tally.operator("not");
                if let Some(argument) = node.child_by_field_name("argument") {
                    tally.operand(text(argument));
                }
            }
            "comparison_operator" => {
                let mut cursor = node.walk();
                for op in node.children_by_field_name("operators", &mut cursor) {
                    tally.operator(text(op));
                }
                let mut cursor = node.walk();
                for operand in node.named_children(&mut cursor) {
                    if operand.kind() != "comment" {
                        tally.operand(text(operand));
                    }
                }
            }
            _ => {}
        }
    }

    HalsteadMetrics {
        distinct_operators: tally.operators.len(),
        distinct_operands: tally.operands.len(),
        total_operators: tally.total_operators,
        total_operands: tally.total_operands,
    }
}
