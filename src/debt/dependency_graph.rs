//! Entity-level dependency graph of a single module.
//!
//! Resolution is lexical and heuristic: a reference only becomes an edge
//! when its name matches something declared or imported in the file.
//! Builtins, attributes of unknown objects and dynamically built names are
//! dropped, so every edge joins two nameable entities.

use crate::core::{
    ClassRecord, DependencyEdge, EdgeKind, EntityKind, Error, FunctionRecord, ImportRecord,
    Result, SourceUnit,
};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

pub const COMPONENT: &str = "dependency mapping";

/// Entity standing for statements outside any def or class
pub const MODULE_ENTITY: &str = "<module>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
}

/// What dependency mapping hands to the report and the rule battery
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyMap {
    pub edges: Vec<DependencyEdge>,
    pub cycles: Vec<Vec<String>>,
    /// Functions related through `call` edges, see
    /// [`DependencyGraph::function_clusters`]
    pub clusters: Vec<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraph<Entity, EdgeKind>,
    index: HashMap<String, NodeIndex>,
}

/// Names the resolver can bind references to
struct Scope<'a> {
    functions: HashSet<&'a str>,
    classes: HashMap<&'a str, &'a ClassRecord>,
    imports: HashMap<String, &'a ImportRecord>,
}

impl<'a> Scope<'a> {
    fn new(unit: &'a SourceUnit) -> Self {
        let mut imports = HashMap::new();
        // Later imports rebind earlier ones
        for import in &unit.imports {
            for binding in import.bindings() {
                imports.insert(binding, import);
            }
        }
        Self {
            functions: unit.functions.iter().map(|f| f.name.as_str()).collect(),
            classes: unit.classes.iter().map(|c| (c.name.as_str(), c)).collect(),
            imports,
        }
    }

    fn has_method(&self, class: &str, method: &str) -> bool {
        self.classes
            .get(class)
            .is_some_and(|c| c.method_names().any(|m| m == method))
    }

    /// Function, then class, then imported binding
    fn resolve_name(&self, name: &str) -> Option<(String, EdgeKind)> {
        if self.functions.contains(name) || self.classes.contains_key(name) {
            return Some((name.to_string(), EdgeKind::Call));
        }
        self.imports
            .get(name)
            .map(|import| (import.module.clone(), EdgeKind::ImportUse))
    }

    /// `Base`, `pkg.Base` or `Generic[T]` as written in a class header
    fn resolve_base(&self, base: &str) -> Option<String> {
        let base = base.split('[').next().unwrap_or(base).trim();
        if self.classes.contains_key(base) {
            return Some(base.to_string());
        }
        let root = base.split('.').next().unwrap_or(base);
        self.imports.get(root).map(|import| import.module.clone())
    }
}

impl DependencyGraph {
    /// Build the graph, or fail with `ResourceLimitExceeded` when the file
    /// declares more than `max_entities` entities.
    pub fn build(unit: &SourceUnit, max_entities: usize) -> Result<Self> {
        let modules: BTreeSet<&str> = unit.imports.iter().map(|i| i.module.as_str()).collect();
        let entity_count = 1 + unit.total_classes() + unit.total_functions() + modules.len();
        if entity_count > max_entities {
            return Err(Error::resource_limit(
                COMPONENT,
                format!("{entity_count} entities exceeds the limit of {max_entities}"),
            ));
        }

        let mut graph = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        };
        let scope = Scope::new(unit);

        graph.add_entity(MODULE_ENTITY, EntityKind::Module);
        for item in declarations(unit) {
            match item {
                Declaration::Function(f) => {
                    graph.add_entity(&f.qualified_name, EntityKind::Function)
                }
                Declaration::Class(c) => {
                    graph.add_entity(&c.name, EntityKind::Class);
                    for method in &c.methods {
                        graph.add_entity(&method.qualified_name, EntityKind::Function);
                    }
                }
            }
        }
        for module in modules {
            graph.add_entity(module, EntityKind::Module);
        }

        graph.link_names(MODULE_ENTITY, &unit.module_references, &scope);
        for item in declarations(unit) {
            match item {
                Declaration::Function(f) => graph.link_function(f, &scope),
                Declaration::Class(c) => {
                    for base in &c.bases {
                        if let Some(target) = scope.resolve_base(base) {
                            graph.add_edge(&c.name, &target, EdgeKind::Inheritance);
                        }
                    }
                    graph.link_names(&c.name, &c.references, &scope);
                    for method in &c.methods {
                        graph.link_function(method, &scope);
                    }
                }
            }
        }

        log::debug!(
            "Dependency graph: {} entities, {} edges",
            graph.entity_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn add_entity(&mut self, name: &str, kind: EntityKind) {
        if !self.index.contains_key(name) {
            let node = self.graph.add_node(Entity {
                name: name.to_string(),
                kind,
            });
            self.index.insert(name.to_string(), node);
        }
    }

    /// Self-loops and repeats are ignored
    fn add_edge(&mut self, source: &str, target: &str, kind: EdgeKind) {
        if source == target {
            return;
        }
        let (Some(&from), Some(&to)) = (self.index.get(source), self.index.get(target)) else {
            return;
        };
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == kind);
        if !exists {
            self.graph.add_edge(from, to, kind);
        }
    }

    fn link_function(&mut self, function: &FunctionRecord, scope: &Scope) {
        let source = function.qualified_name.as_str();

        for dotted in &function.dotted_references {
            if let Some((class, method)) = dotted.split_once('.') {
                if scope.has_method(class, method) {
                    self.add_edge(source, dotted, EdgeKind::Call);
                }
            }
        }
        if let Some(class) = &function.class_name {
            for attribute in &function.self_references {
                if scope.has_method(class, attribute) {
                    self.add_edge(source, &format!("{class}.{attribute}"), EdgeKind::Call);
                }
            }
        }
        self.link_names(source, &function.references, scope);
    }

    fn link_names(&mut self, source: &str, names: &BTreeSet<String>, scope: &Scope) {
        for name in names {
            if let Some((target, kind)) = scope.resolve_name(name) {
                self.add_edge(source, &target, kind);
            }
        }
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&node| &self.graph[node])
    }

    /// Edges in insertion order
    pub fn edges(&self) -> Vec<DependencyEdge> {
        self.graph
            .edge_references()
            .map(|edge| DependencyEdge {
                source: self.graph[edge.source()].name.clone(),
                target: self.graph[edge.target()].name.clone(),
                kind: *edge.weight(),
            })
            .collect()
    }

    pub fn fan_out(&self, name: &str) -> usize {
        self.index
            .get(name)
            .map(|&node| self.graph.edges_directed(node, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// Out-degree of every entity that can originate edges, declaration order
    pub fn fan_outs(&self) -> Vec<(String, EntityKind, usize)> {
        self.graph
            .node_indices()
            .map(|node| {
                let entity = &self.graph[node];
                let degree = self.graph.edges_directed(node, Direction::Outgoing).count();
                (entity.name.clone(), entity.kind, degree)
            })
            .collect()
    }

    /// Whether any `call` edge points at `name`
    pub fn is_called(&self, name: &str) -> bool {
        self.index.get(name).is_some_and(|&node| {
            self.graph
                .edges_directed(node, Direction::Incoming)
                .any(|edge| *edge.weight() == EdgeKind::Call)
        })
    }

    /// Strongly connected components with more than one member, members and
    /// components both in declaration order
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut components: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|mut component| {
                component.sort();
                component
            })
            .collect();
        components.sort();
        components
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|node| self.graph[node].name.clone())
                    .collect()
            })
            .collect()
    }

    /// Functions and methods joined by `call` edges in either direction.
    /// Members keep declaration order and clusters are ordered by their
    /// first member; a function with no call relation is its own cluster.
    pub fn function_clusters(&self, unit: &SourceUnit) -> Vec<Vec<String>> {
        let mut sets = UnionFind::<usize>::new(self.graph.node_count());
        for edge in self.graph.edge_references() {
            let (from, to) = (edge.source(), edge.target());
            let between_functions = self.graph[from].kind == EntityKind::Function
                && self.graph[to].kind == EntityKind::Function;
            if *edge.weight() == EdgeKind::Call && between_functions {
                sets.union(from.index(), to.index());
            }
        }

        let mut clusters: Vec<(usize, Vec<String>)> = Vec::new();
        let mut seen = HashSet::new();
        for function in unit.all_functions() {
            let name = function.qualified_name.as_str();
            let Some(&node) = self.index.get(name) else {
                continue;
            };
            if !seen.insert(name) {
                continue;
            }
            let root = sets.find(node.index());
            match clusters.iter_mut().find(|(r, _)| *r == root) {
                Some((_, members)) => members.push(name.to_string()),
                None => clusters.push((root, vec![name.to_string()])),
            }
        }
        clusters.into_iter().map(|(_, members)| members).collect()
    }

    pub fn summarize(&self, unit: &SourceUnit) -> DependencyMap {
        DependencyMap {
            edges: self.edges(),
            cycles: self.cycles(),
            clusters: self.function_clusters(unit),
        }
    }
}

enum Declaration<'a> {
    Function(&'a FunctionRecord),
    Class(&'a ClassRecord),
}

/// Top-level functions and classes in source order
fn declarations(unit: &SourceUnit) -> Vec<Declaration<'_>> {
    let mut items: Vec<(usize, Declaration)> = unit
        .functions
        .iter()
        .map(|f| (f.lines.start, Declaration::Function(f)))
        .chain(
            unit.classes
                .iter()
                .map(|c| (c.lines.start, Declaration::Class(c))),
        )
        .collect();
    items.sort_by_key(|(line, _)| *line);
    items.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::build_source_unit;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn graph_of(source: &str) -> DependencyGraph {
        DependencyGraph::build(&build_source_unit(source).unwrap(), 2000).unwrap()
    }

    fn edge(source: &str, target: &str, kind: EdgeKind) -> DependencyEdge {
        DependencyEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind,
        }
    }

    #[test]
    fn resolves_calls_imports_and_inheritance() {
        let graph = graph_of(indoc! {"
            import os
            from collections import OrderedDict as OD

            class Base:
                def run(self):
                    return self.step()

                def step(self):
                    return os.getcwd()

            class Child(Base):
                def go(self):
                    return Base.run(self)

            def build():
                return Child()

            def recurse(n):
                return recurse(n - 1) + len(OD())

            if __name__ == '__main__':
                build()
        "});

        assert_eq!(
            graph.edges(),
            vec![
                edge("<module>", "build", EdgeKind::Call),
                edge("Base.run", "Base.step", EdgeKind::Call),
                edge("Base.step", "os", EdgeKind::ImportUse),
                edge("Child", "Base", EdgeKind::Inheritance),
                edge("Child.go", "Base.run", EdgeKind::Call),
                edge("Child.go", "Base", EdgeKind::Call),
                edge("build", "Child", EdgeKind::Call),
                edge("recurse", "collections", EdgeKind::ImportUse),
            ]
        );
        assert_eq!(graph.fan_out("Child.go"), 2);
        assert!(graph.is_called("build"));
        assert!(!graph.is_called("recurse"));
        assert_eq!(graph.entity("os").unwrap().kind, EntityKind::Module);
    }

    #[test]
    fn never_records_call_self_loops_or_unknown_names() {
        let graph = graph_of(indoc! {"
            def f(n):
                print(n)
                return f(n - 1) if n else undefined_name
        "});
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn mutual_recursion_is_a_cycle() {
        let graph = graph_of(indoc! {"
            def ping(n):
                return pong(n - 1)

            def pong(n):
                return ping(n - 1)

            def alone():
                pass
        "});
        assert_eq!(graph.cycles(), vec![vec!["ping".to_string(), "pong".to_string()]]);
    }

    #[test]
    fn clusters_follow_call_relations_in_declaration_order() {
        let source = indoc! {"
            import json

            def load(path):
                return parse(path)

            def report():
                return json.dumps({})

            class Store:
                def save(self):
                    return self.encode()

                def encode(self):
                    return report()

            def parse(path):
                return path
        "};
        let unit = build_source_unit(source).unwrap();
        let graph = DependencyGraph::build(&unit, 2000).unwrap();
        let strings = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        assert_eq!(
            graph.function_clusters(&unit),
            vec![
                strings(&["load", "parse"]),
                strings(&["report", "Store.save", "Store.encode"]),
            ]
        );
    }

    #[test]
    fn uncalled_functions_stand_alone() {
        let unit = build_source_unit("def a():\n    pass\n\ndef b():\n    pass\n").unwrap();
        let map = DependencyGraph::build(&unit, 2000).unwrap().summarize(&unit);
        assert_eq!(map.clusters, vec![vec!["a".to_string()], vec!["b".to_string()]]);
        assert!(map.edges.is_empty());
        assert!(map.cycles.is_empty());
    }

    #[test]
    fn entity_cap_skips_mapping() {
        let unit = build_source_unit("def a():\n    pass\n\ndef b():\n    pass\n").unwrap();
        let err = DependencyGraph::build(&unit, 2).unwrap_err();
        assert!(matches!(err, Error::ResourceLimitExceeded { .. }));
    }
}
