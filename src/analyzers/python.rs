use crate::analyzers::python_ast_extraction::PythonAstExtractor;
use crate::analyzers::{node_text, preorder, raw};
use crate::core::{Error, Result, SourceUnit};
use tree_sitter::{Node, Parser, Tree};

pub struct PythonAnalyzer {
    parser: Parser,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {e}")))?;
        Ok(Self { parser })
    }

    fn parse_tree(&mut self, content: &str) -> Result<Tree> {
        self.parser
            .parse(content, None)
            .ok_or_else(|| Error::Parser("Failed to parse Python code".to_string()))
    }

    pub fn parse(&mut self, content: &str) -> Result<SourceUnit> {
        let tree = self.parse_tree(content)?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(describe_syntax_error(root, content));
        }
        if let Some(error) = find_python2_syntax(root, content) {
            return Err(error);
        }

        let contents = PythonAstExtractor::new(content).extract_module(root);
        let raw = raw::raw_metrics(root, content);
        log::debug!(
            "Built source model: {} imports, {} classes, {} top-level functions",
            contents.imports.len(),
            contents.classes.len(),
            contents.functions.len()
        );

        Ok(SourceUnit {
            text: content.to_string(),
            raw,
            imports: contents.imports,
            classes: contents.classes,
            functions: contents.functions,
            module_references: contents.module_references,
            tree,
        })
    }
}

/// Locate the first error or missing node in document order
fn describe_syntax_error(root: Node, content: &str) -> Error {
    let Some(node) = preorder(root).find(|n| n.is_error() || n.is_missing()) else {
        return Error::syntax(1, 1, "invalid syntax");
    };

    let position = node.start_position();
    let message = if node.is_missing() {
        format!("expected '{}'", node.kind())
    } else {
        let snippet: String = node_text(node, content)
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(40)
            .collect();
        if snippet.trim().is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near '{}'", snippet.trim())
        }
    };

    Error::syntax(position.row + 1, position.column + 1, message)
}

/// Python 2 forms the grammar still accepts but Python 3 rejects
fn find_python2_syntax(root: Node, content: &str) -> Option<Error> {
    preorder(root).find_map(|node| {
        let message = match node.kind() {
            "print_statement" => "Missing parentheses in call to 'print'",
            "exec_statement" => "Missing parentheses in call to 'exec'",
            "except_clause" if has_token(node, ",") => {
                "multiple exception types must be parenthesized"
            }
            "comparison_operator" if has_token(node, "<>") => "invalid syntax near '<>'",
            "integer" if node_text(node, content).ends_with(&['l', 'L'][..]) => {
                "invalid decimal literal"
            }
            _ => return None,
        };
        let position = node.start_position();
        Some(Error::syntax(position.row + 1, position.column + 1, message))
    })
}

fn has_token(node: Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}
