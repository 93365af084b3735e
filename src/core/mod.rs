pub mod errors;
pub mod metrics;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Range;

pub use errors::{Error, Result};

/// Inclusive, 1-based source line span
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn line_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// One name pulled in by `from module import name [as alias]`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    pub fn bound_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRecord {
    /// Dotted module path; relative imports keep their leading dots
    pub module: String,
    /// Empty for a whole-module import
    pub names: Vec<ImportedName>,
    /// `import numpy as np`
    pub alias: Option<String>,
    pub wildcard: bool,
    pub line: usize,
}

impl ImportRecord {
    pub fn is_whole_module(&self) -> bool {
        self.names.is_empty() && !self.wildcard
    }

    /// Local names this statement introduces into the module namespace
    pub fn bindings(&self) -> Vec<String> {
        if self.wildcard {
            return Vec::new();
        }
        if self.is_whole_module() {
            let bound = match &self.alias {
                Some(alias) => alias.clone(),
                None => self
                    .module
                    .split('.')
                    .next()
                    .unwrap_or(&self.module)
                    .to_string(),
            };
            return vec![bound];
        }
        self.names
            .iter()
            .map(|n| n.bound_name().to_string())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FunctionRecord {
    pub name: String,
    /// Dotted name including the enclosing class, if any
    pub qualified_name: String,
    pub class_name: Option<String>,
    pub parameters: Vec<String>,
    pub lines: LineRange,
    /// Source text from the first decorator (or `def`) to the end of the body
    pub body: String,
    pub decorators: Vec<String>,
    pub is_async: bool,
    /// Filled in by the complexity scorer via [`SourceUnit::with_complexity`]
    pub complexity: Option<u32>,
    /// Bare names loaded in the body, minus parameters
    pub references: BTreeSet<String>,
    /// Dotted `Name.attr` references, used to resolve `Class.method` calls
    pub dotted_references: BTreeSet<String>,
    /// Attributes accessed on the receiver (`self.x`, `self.helper()`)
    pub self_references: BTreeSet<String>,
    /// Attributes assigned on the receiver (`self.x = ...`)
    pub self_assignments: BTreeSet<String>,
    #[serde(skip)]
    pub node_range: Range<usize>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClassRecord {
    pub name: String,
    pub lines: LineRange,
    pub methods: Vec<FunctionRecord>,
    /// Base-class expressions as written (`Base`, `abc.ABC`)
    pub bases: Vec<String>,
    /// Names assigned in the class body plus `self.X` targets in its methods
    pub attributes: BTreeSet<String>,
    /// Names loaded in the class body outside of methods
    pub references: BTreeSet<String>,
}

impl ClassRecord {
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

/// Line accounting for the whole file
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawMetrics {
    pub total_lines: usize,
    pub sloc: usize,
    pub comment_lines: usize,
    pub docstring_lines: usize,
    pub blank_lines: usize,
}

impl RawMetrics {
    /// Comment and docstring lines as a percentage of non-blank lines
    pub fn comment_percentage(&self) -> f64 {
        let non_blank = self.total_lines.saturating_sub(self.blank_lines);
        if non_blank == 0 {
            return 0.0;
        }
        let commented = (self.comment_lines + self.docstring_lines).min(non_blank);
        100.0 * commented as f64 / non_blank as f64
    }
}

/// The analyzed file. Built once per request by the source model builder and
/// never mutated afterwards.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub text: String,
    pub raw: RawMetrics,
    pub imports: Vec<ImportRecord>,
    pub classes: Vec<ClassRecord>,
    /// Top-level functions only; methods live under their class
    pub functions: Vec<FunctionRecord>,
    /// Names loaded by module-level statements outside any def or class
    pub module_references: BTreeSet<String>,
    pub(crate) tree: tree_sitter::Tree,
}

impl SourceUnit {
    pub fn total_functions(&self) -> usize {
        self.functions.len() + self.classes.iter().map(|c| c.methods.len()).sum::<usize>()
    }

    pub fn total_classes(&self) -> usize {
        self.classes.len()
    }

    /// Top-level functions and methods flattened in declaration order
    pub fn all_functions(&self) -> Vec<&FunctionRecord> {
        let mut all: Vec<&FunctionRecord> = self
            .functions
            .iter()
            .chain(self.classes.iter().flat_map(|c| c.methods.iter()))
            .collect();
        all.sort_by_key(|f| (f.lines.start, f.node_range.start));
        all
    }

    pub fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns a copy whose function records carry the scored complexity
    pub fn with_complexity(mut self, report: &ComplexityReport) -> Self {
        let lookup = |f: &mut FunctionRecord| {
            f.complexity = report
                .functions
                .iter()
                .find(|c| c.name == f.qualified_name && c.line == f.lines.start)
                .map(|c| c.complexity);
        };
        self.functions.iter_mut().for_each(lookup);
        self.classes
            .iter_mut()
            .flat_map(|c| c.methods.iter_mut())
            .for_each(lookup);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionComplexity {
    pub name: String,
    pub line: usize,
    pub complexity: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassCohesion {
    pub name: String,
    pub line: usize,
    pub methods: usize,
    pub cohesive_methods: usize,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComplexityReport {
    /// One entry per function record, in declaration order
    pub functions: Vec<FunctionComplexity>,
    pub average_complexity: f64,
    pub max_complexity: u32,
    /// First function in declaration order reaching `max_complexity`
    pub max_complexity_function: Option<String>,
    pub halstead_volume: f64,
    pub maintainability: f64,
    pub classes: Vec<ClassCohesion>,
    /// Mean class cohesion; absent when the file declares no classes
    pub cohesion: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DuplicatePair {
    pub first: String,
    pub second: String,
    pub similarity: f64,
    pub first_lines: LineRange,
    pub second_lines: LineRange,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    ImportUse,
    Call,
    Inheritance,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display_str = match self {
            EdgeKind::ImportUse => "import-use",
            EdgeKind::Call => "call",
            EdgeKind::Inheritance => "inheritance",
        };
        write!(f, "{display_str}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Module,
    Class,
    Function,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    UnsupportedConstruct,
    ResourceLimitExceeded,
}

/// A recovered, non-fatal condition surfaced in the report
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub component: String,
    pub message: String,
}

impl Notice {
    /// Converts a recoverable error; fatal kinds yield `None`
    pub fn from_error(component: &str, error: &Error) -> Option<Self> {
        let kind = match error {
            Error::UnsupportedConstruct { .. } => NoticeKind::UnsupportedConstruct,
            Error::ResourceLimitExceeded { .. } => NoticeKind::ResourceLimitExceeded,
            _ => return None,
        };
        Some(Self {
            kind,
            component: component.to_string(),
            message: error.to_string(),
        })
    }
}
