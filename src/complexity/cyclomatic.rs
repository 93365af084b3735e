use crate::analyzers::preorder;
use tree_sitter::Node;

/// McCabe complexity of a function node: one plus its decision points.
/// Nested defs and lambdas are part of the walk.
pub fn calculate_cyclomatic(function: Node) -> u32 {
    1 + preorder(function).map(decision_points).sum::<u32>()
}

fn decision_points(node: Node) -> u32 {
    match node.kind() {
        "if_statement" | "elif_clause" => 1,
        "for_statement" | "while_statement" => 1,
        "except_clause" | "except_group_clause" => 1,
        // One node per `and`/`or`; `a and b or c` nests two
        "boolean_operator" => 1,
        "conditional_expression" => 1,
        "for_in_clause" | "if_clause" => 1,
        "case_clause" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tree_sitter::Parser;

    fn complexity_of_first_def(source: &str) -> u32 {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        let def = preorder(tree.root_node())
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        calculate_cyclomatic(def)
    }

    #[test]
    fn straight_line_function_is_one() {
        assert_eq!(complexity_of_first_def("def f():\n    return 1\n"), 1);
    }

    #[test]
    fn each_if_adds_one() {
        let base = complexity_of_first_def(indoc! {"
            def f(x):
                y = x
                return y
        "});
        let with_if = complexity_of_first_def(indoc! {"
            def f(x):
                y = x
                if y:
                    return 0
                return y
        "});
        assert_eq!(with_if, base + 1);
    }

    #[test]
    fn counts_every_decision_kind() {
        let count = complexity_of_first_def(indoc! {"
            def f(items, flag):
                if flag and items:
                    pass
                elif flag or not items:
                    pass
                for i in items:
                    while i:
                        i -= 1
                try:
                    pass
                except ValueError:
                    pass
                y = 1 if flag else 2
                z = [a for a in items if a]
                match flag:
                    case 1:
                        pass
                    case _:
                        pass
                return lambda: y if z else 0
        "});
        // if, and, elif, or, for, while, except, ternary, for_in, if_clause,
        // two cases, ternary in lambda
        assert_eq!(count, 1 + 13);
    }

    #[test]
    fn nested_definitions_count_toward_enclosing() {
        let count = complexity_of_first_def(indoc! {"
            def outer(x):
                def inner(y):
                    if y:
                        return 1
                    return 0
                return inner(x)
        "});
        assert_eq!(count, 2);
    }
}
