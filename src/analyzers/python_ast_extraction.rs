//! Structural extraction from a tree-sitter Python tree: imports, classes,
//! top-level functions and the names each entity references.
//!
//! Reference collection is lexical and best-effort. Python gives no static
//! guarantee about what a name resolves to, so the sets gathered here are
//! "names loaded in this body", with obvious local bindings (parameters,
//! assignment, `for` and `as` targets) left out.

use crate::analyzers::{end_line, node_text, start_line};
use crate::core::{ClassRecord, FunctionRecord, ImportRecord, ImportedName, LineRange};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Module-level statements whose blocks may hold definitions or imports
const COMPOUND_STATEMENTS: &[&str] = &[
    "if_statement",
    "try_statement",
    "with_statement",
    "for_statement",
    "while_statement",
    "match_statement",
];

const CLAUSES: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
];

/// Nodes whose subtrees never contribute loaded names
const SKIPPED_SUBTREES: &[&str] = &[
    "comment",
    "decorator",
    "parameters",
    "lambda_parameters",
    "as_pattern_target",
    "global_statement",
    "nonlocal_statement",
    "import_statement",
    "import_from_statement",
    "future_import_statement",
    "type",
];

#[derive(Debug, Default)]
pub struct ModuleContents {
    pub imports: Vec<ImportRecord>,
    pub classes: Vec<ClassRecord>,
    pub functions: Vec<FunctionRecord>,
    pub module_references: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct References {
    names: BTreeSet<String>,
    dotted: BTreeSet<String>,
    receiver_reads: BTreeSet<String>,
    receiver_writes: BTreeSet<String>,
}

pub struct PythonAstExtractor<'a> {
    source: &'a str,
}

impl<'a> PythonAstExtractor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.source)
    }

    pub fn extract_module(&self, root: Node) -> ModuleContents {
        let mut contents = ModuleContents::default();
        self.visit_statements(root, &mut contents);
        contents
    }

    fn visit_statements(&self, container: Node, contents: &mut ModuleContents) {
        let mut cursor = container.walk();
        for stmt in container.named_children(&mut cursor) {
            self.visit_module_statement(stmt, contents);
        }
    }

    fn visit_module_statement(&self, stmt: Node, contents: &mut ModuleContents) {
        match stmt.kind() {
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                contents.imports.extend(self.extract_imports(stmt));
            }
            "function_definition" => {
                contents
                    .functions
                    .push(self.extract_function(stmt, stmt, None));
            }
            "class_definition" => contents.classes.push(self.extract_class(stmt, stmt)),
            "decorated_definition" => match stmt.child_by_field_name("definition") {
                Some(def) if def.kind() == "function_definition" => {
                    contents.functions.push(self.extract_function(def, stmt, None));
                }
                Some(def) if def.kind() == "class_definition" => {
                    contents.classes.push(self.extract_class(def, stmt));
                }
                _ => {}
            },
            kind if COMPOUND_STATEMENTS.contains(&kind) || CLAUSES.contains(&kind) => {
                let mut cursor = stmt.walk();
                let children: Vec<Node> = stmt.named_children(&mut cursor).collect();
                for child in children {
                    match child.kind() {
                        "block" => self.visit_statements(child, contents),
                        k if CLAUSES.contains(&k) => self.visit_module_statement(child, contents),
                        _ => {
                            let refs = self.collect_references(child, None);
                            contents.module_references.extend(refs.names);
                        }
                    }
                }
            }
            "comment" => {}
            _ => {
                let refs = self.collect_references(stmt, None);
                contents.module_references.extend(refs.names);
            }
        }
    }

    fn extract_imports(&self, stmt: Node) -> Vec<ImportRecord> {
        let line = start_line(stmt);
        let mut cursor = stmt.walk();

        match stmt.kind() {
            "import_statement" => stmt
                .children_by_field_name("name", &mut cursor)
                .map(|name| {
                    let (module, alias) = self.split_alias(name);
                    ImportRecord {
                        module,
                        names: Vec::new(),
                        alias,
                        wildcard: false,
                        line,
                    }
                })
                .collect(),
            _ => {
                let module = if stmt.kind() == "future_import_statement" {
                    "__future__".to_string()
                } else {
                    stmt.child_by_field_name("module_name")
                        .map(|m| self.text(m).to_string())
                        .unwrap_or_default()
                };
                let names: Vec<ImportedName> = stmt
                    .children_by_field_name("name", &mut cursor)
                    .map(|name| {
                        let (name, alias) = self.split_alias(name);
                        ImportedName { name, alias }
                    })
                    .collect();
                let mut cursor = stmt.walk();
                let wildcard = stmt
                    .children(&mut cursor)
                    .any(|c| c.kind() == "wildcard_import");

                vec![ImportRecord {
                    module,
                    names,
                    alias: None,
                    wildcard,
                    line,
                }]
            }
        }
    }

    /// `a.b as c` -> ("a.b", Some("c")); `a.b` -> ("a.b", None)
    fn split_alias(&self, node: Node) -> (String, Option<String>) {
        if node.kind() == "aliased_import" {
            let name = node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_default();
            let alias = node
                .child_by_field_name("alias")
                .map(|a| self.text(a).to_string());
            (name, alias)
        } else {
            (self.text(node).to_string(), None)
        }
    }

    /// `outer` is the decorated_definition wrapper when present, else `def`
    fn extract_function(
        &self,
        def: Node,
        outer: Node,
        class_name: Option<&str>,
    ) -> FunctionRecord {
        let name = def
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let parameters = def
            .child_by_field_name("parameters")
            .map(|p| self.extract_parameters(p))
            .unwrap_or_default();
        let decorators = self.extract_decorators(outer);
        let is_async = def.child(0).is_some_and(|c| c.kind() == "async");

        let receiver = class_name
            .filter(|_| !decorators.iter().any(|d| d == "staticmethod"))
            .and(parameters.first())
            .map(String::as_str);

        let mut refs = def
            .child_by_field_name("body")
            .map(|body| self.collect_references(body, receiver))
            .unwrap_or_default();
        for param in &parameters {
            refs.names.remove(param);
        }

        let qualified_name = match class_name {
            Some(class) => format!("{class}.{name}"),
            None => name.clone(),
        };

        FunctionRecord {
            name,
            qualified_name,
            class_name: class_name.map(str::to_string),
            parameters,
            lines: LineRange::new(start_line(outer), end_line(def)),
            body: self
                .source
                .get(outer.start_byte()..def.end_byte())
                .unwrap_or_default()
                .to_string(),
            decorators,
            is_async,
            complexity: None,
            references: refs.names,
            dotted_references: refs.dotted,
            self_references: refs.receiver_reads,
            self_assignments: refs.receiver_writes,
            node_range: def.byte_range(),
        }
    }

    fn extract_parameters(&self, params: Node) -> Vec<String> {
        let mut cursor = params.walk();
        let children: Vec<Node> = params.named_children(&mut cursor).collect();
        children
            .into_iter()
            .filter_map(|p| self.parameter_name(p))
            .collect()
    }

    fn parameter_name(&self, param: Node) -> Option<String> {
        match param.kind() {
            "identifier" => Some(self.text(param).to_string()),
            "default_parameter" | "typed_default_parameter" => param
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                let mut cursor = param.walk();
                let inner = param.named_children(&mut cursor).find(|c| {
                    matches!(
                        c.kind(),
                        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern"
                    )
                });
                inner.and_then(|c| self.parameter_name(c))
            }
            _ => None,
        }
    }

    fn extract_decorators(&self, outer: Node) -> Vec<String> {
        if outer.kind() != "decorated_definition" {
            return Vec::new();
        }
        let mut cursor = outer.walk();
        let decorators: Vec<Node> = outer
            .children(&mut cursor)
            .filter(|c| c.kind() == "decorator")
            .collect();
        decorators
            .into_iter()
            .filter_map(|d| d.named_child(0))
            .map(|expr| {
                let target = if expr.kind() == "call" {
                    expr.child_by_field_name("function").unwrap_or(expr)
                } else {
                    expr
                };
                self.text(target).to_string()
            })
            .collect()
    }

    fn extract_class(&self, def: Node, outer: Node) -> ClassRecord {
        let name = def
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let bases = def
            .child_by_field_name("superclasses")
            .map(|args| {
                let mut cursor = args.walk();
                let children: Vec<Node> = args.named_children(&mut cursor).collect();
                children
                    .into_iter()
                    .filter(|a| !matches!(a.kind(), "keyword_argument" | "comment"))
                    .map(|a| self.text(a).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut methods = Vec::new();
        let mut attributes = BTreeSet::new();
        let mut references = BTreeSet::new();

        if let Some(body) = def.child_by_field_name("body") {
            let mut cursor = body.walk();
            let statements: Vec<Node> = body.named_children(&mut cursor).collect();
            for stmt in statements {
                match stmt.kind() {
                    "function_definition" => {
                        methods.push(self.extract_function(stmt, stmt, Some(&name)));
                    }
                    "decorated_definition" => match stmt.child_by_field_name("definition") {
                        Some(d) if d.kind() == "function_definition" => {
                            methods.push(self.extract_function(d, stmt, Some(&name)));
                        }
                        Some(d) => references.extend(self.collect_references(d, None).names),
                        None => {}
                    },
                    "expression_statement" => {
                        self.collect_class_attributes(stmt, &mut attributes);
                        references.extend(self.collect_references(stmt, None).names);
                    }
                    "comment" => {}
                    _ => references.extend(self.collect_references(stmt, None).names),
                }
            }
        }

        for method in &methods {
            attributes.extend(method.self_assignments.iter().cloned());
        }

        ClassRecord {
            name,
            lines: LineRange::new(start_line(outer), end_line(def)),
            methods,
            bases,
            attributes,
            references,
        }
    }

    /// Class-body assignments (`x = 1`, `y: int`) declare class attributes
    fn collect_class_attributes(&self, stmt: Node, attributes: &mut BTreeSet<String>) {
        let mut cursor = stmt.walk();
        let assignments: Vec<Node> = stmt
            .named_children(&mut cursor)
            .filter(|c| c.kind() == "assignment")
            .collect();
        for assignment in assignments {
            if let Some(left) = assignment.child_by_field_name("left") {
                self.bound_identifiers(left, attributes);
            }
        }
    }

    fn bound_identifiers(&self, target: Node, out: &mut BTreeSet<String>) {
        match target.kind() {
            "identifier" => {
                out.insert(self.text(target).to_string());
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
                let mut cursor = target.walk();
                let children: Vec<Node> = target.named_children(&mut cursor).collect();
                for child in children {
                    self.bound_identifiers(child, out);
                }
            }
            _ => {}
        }
    }

    /// Walk `root` collecting loaded names. `receiver` is the method's first
    /// parameter (`self`/`cls`); attribute accesses on it are kept apart.
    fn collect_references(&self, root: Node, receiver: Option<&str>) -> References {
        let mut refs = References::default();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            let kind = node.kind();
            if SKIPPED_SUBTREES.contains(&kind) {
                continue;
            }

            match kind {
                "identifier" => {
                    let name = self.text(node);
                    if Some(name) != receiver {
                        refs.names.insert(name.to_string());
                    }
                    continue;
                }
                "attribute" => {
                    self.visit_attribute(node, receiver, &mut refs, &mut stack);
                    continue;
                }
                "assignment" | "augmented_assignment" => {
                    if let Some(left) = node.child_by_field_name("left") {
                        self.visit_assignment_target(left, receiver, &mut refs, &mut stack);
                    }
                    if let Some(right) = node.child_by_field_name("right") {
                        stack.push(right);
                    }
                    continue;
                }
                "keyword_argument" => {
                    if let Some(value) = node.child_by_field_name("value") {
                        stack.push(value);
                    }
                    continue;
                }
                "named_expression" => {
                    if let Some(value) = node.child_by_field_name("value") {
                        stack.push(value);
                    }
                    continue;
                }
                "lambda" => {
                    if let Some(body) = node.child_by_field_name("body") {
                        stack.push(body);
                    }
                    continue;
                }
                // Nested definitions bind their own name; only their bodies load names
                "function_definition" | "class_definition" => {
                    for field in ["superclasses", "body"] {
                        if let Some(child) = node.child_by_field_name(field) {
                            stack.push(child);
                        }
                    }
                    continue;
                }
                "for_statement" | "for_in_clause" => {
                    let left = node.child_by_field_name("left").map(|l| l.id());
                    let mut cursor = node.walk();
                    let children: Vec<Node> = node
                        .children(&mut cursor)
                        .filter(|c| Some(c.id()) != left)
                        .collect();
                    stack.extend(children.into_iter().rev());
                    continue;
                }
                _ => {}
            }

            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }

        refs
    }

    fn visit_attribute<'t>(
        &self,
        node: Node<'t>,
        receiver: Option<&str>,
        refs: &mut References,
        stack: &mut Vec<Node<'t>>,
    ) {
        let (Some(object), Some(attribute)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("attribute"),
        ) else {
            return;
        };

        if object.kind() != "identifier" {
            stack.push(object);
            return;
        }

        let object_name = self.text(object);
        let attribute_name = self.text(attribute);
        if Some(object_name) == receiver {
            refs.receiver_reads.insert(attribute_name.to_string());
        } else {
            refs.names.insert(object_name.to_string());
            refs.dotted.insert(format!("{object_name}.{attribute_name}"));
        }
    }

    fn visit_assignment_target<'t>(
        &self,
        target: Node<'t>,
        receiver: Option<&str>,
        refs: &mut References,
        stack: &mut Vec<Node<'t>>,
    ) {
        match target.kind() {
            // Plain names are local bindings
            "identifier" => {}
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" => {
                let mut cursor = target.walk();
                let children: Vec<Node<'t>> = target.named_children(&mut cursor).collect();
                for child in children {
                    self.visit_assignment_target(child, receiver, refs, stack);
                }
            }
            "attribute" => {
                let object = target.child_by_field_name("object");
                let attribute = target.child_by_field_name("attribute");
                match (object, attribute) {
                    (Some(object), Some(attribute))
                        if object.kind() == "identifier"
                            && Some(self.text(object)) == receiver =>
                    {
                        let name = self.text(attribute).to_string();
                        refs.receiver_reads.insert(name.clone());
                        refs.receiver_writes.insert(name);
                    }
                    _ => stack.push(target),
                }
            }
            _ => stack.push(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tree_sitter::Parser;

    fn extract(source: &str) -> ModuleContents {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse(source, None).unwrap();
        PythonAstExtractor::new(source).extract_module(tree.root_node())
    }

    #[test]
    fn records_top_level_functions_and_methods() {
        let contents = extract(indoc! {"
            def top(a, b=1, *args, **kwargs):
                def inner():
                    return a
                return inner()

            class Service(Base):
                limit = 10

                def __init__(self, repo):
                    self.repo = repo

                @staticmethod
                def build(config):
                    return Service(config)
        "});

        assert_eq!(contents.functions.len(), 1);
        let top = &contents.functions[0];
        assert_eq!(top.qualified_name, "top");
        assert_eq!(top.parameters, vec!["a", "b", "args", "kwargs"]);
        assert_eq!(top.lines, LineRange::new(1, 4));
        assert!(top.references.contains("inner"));
        assert!(!top.references.contains("a"));

        assert_eq!(contents.classes.len(), 1);
        let class = &contents.classes[0];
        assert_eq!(class.name, "Service");
        assert_eq!(class.bases, vec!["Base"]);
        assert_eq!(class.methods.len(), 2);
        assert_eq!(class.methods[0].qualified_name, "Service.__init__");
        assert_eq!(class.methods[1].decorators, vec!["staticmethod"]);
        assert!(class.attributes.contains("limit"));
        assert!(class.attributes.contains("repo"));
        assert!(class.methods[1].references.contains("Service"));
    }

    #[test]
    fn receiver_accesses_are_tracked_separately() {
        let contents = extract(indoc! {"
            class Counter:
                def bump(self):
                    self.count += 1
                    self.log(self.count)
                    return helper(self)
        "});
        let bump = &contents.classes[0].methods[0];
        assert!(bump.self_references.contains("count"));
        assert!(bump.self_references.contains("log"));
        assert!(bump.self_assignments.contains("count"));
        assert!(bump.references.contains("helper"));
        assert!(!bump.references.contains("self"));
    }

    #[test]
    fn imports_of_every_shape() {
        let contents = extract(indoc! {"
            import os, sys as system
            from collections import defaultdict, OrderedDict as OD
            from . import sibling
            from ..pkg.mod import *
            from __future__ import annotations
        "});
        let imports = &contents.imports;
        assert_eq!(imports.len(), 6);
        assert_eq!(imports[0].module, "os");
        assert_eq!(imports[1].alias.as_deref(), Some("system"));
        assert_eq!(imports[2].module, "collections");
        assert_eq!(imports[2].bindings(), vec!["defaultdict", "OD"]);
        assert_eq!(imports[3].module, ".");
        assert_eq!(imports[4].module, "..pkg.mod");
        assert!(imports[4].wildcard);
        assert_eq!(imports[5].module, "__future__");
        assert!(imports.iter().all(|i| i.line >= 1));
    }

    #[test]
    fn guarded_definitions_count_as_top_level() {
        let contents = extract(indoc! {"
            try:
                import ujson as json
            except ImportError:
                import json

            if True:
                def guarded():
                    pass

            if __name__ == '__main__':
                main()
        "});
        assert_eq!(contents.imports.len(), 2);
        assert_eq!(contents.functions.len(), 1);
        assert_eq!(contents.functions[0].name, "guarded");
        assert!(contents.module_references.contains("main"));
        assert!(contents.module_references.contains("ImportError"));
    }

    #[test]
    fn decorators_stay_in_body_but_not_in_references() {
        let contents = extract(indoc! {"
            @app.route('/x')
            def handler():
                return 1
        "});
        let handler = &contents.functions[0];
        assert_eq!(handler.decorators, vec!["app.route"]);
        assert!(handler.body.starts_with("@app.route"));
        assert!(!handler.references.contains("app"));
        assert_eq!(handler.lines.start, 1);
    }

    #[test]
    fn loop_targets_and_locals_are_not_references() {
        let contents = extract(indoc! {"
            def total(items):
                acc = 0
                for item in items:
                    acc += price(item)
                return [x for x in range(3)]
        "});
        let refs = &contents.functions[0].references;
        assert!(refs.contains("price"));
        assert!(refs.contains("range"));
        assert!(!refs.contains("items"));
        assert!(!refs.contains("acc"));
    }
}
