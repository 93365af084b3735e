use crate::core::{
    ClassCohesion, ComplexityReport, DependencyEdge, DuplicatePair, FunctionComplexity, Notice,
    SourceUnit,
};
use crate::suggestions::Suggestion;
use serde::Serialize;

/// The single object crossing the external boundary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub total_functions: usize,
    pub total_classes: usize,
    pub total_lines: usize,
    pub sloc: usize,
    pub comment_lines: usize,
    pub docstring_lines: usize,
    pub blank_lines: usize,
    pub average_complexity: f64,
    pub max_complexity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_complexity_function: Option<String>,
    pub maintainability: f64,
    pub halstead_volume: f64,
    /// Absent for a file without classes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohesion: Option<f64>,
    pub suggestions: Vec<Suggestion>,
    pub functions: Vec<FunctionComplexity>,
    pub classes: Vec<ClassCohesion>,
    pub duplicates: Vec<DuplicatePair>,
    pub dependencies: Vec<DependencyEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cycles: Vec<Vec<String>>,
    /// Components skipped or approximated, with the reason
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<Notice>,
}

/// Component outputs the report is merged from
pub struct ReportParts {
    pub complexity: ComplexityReport,
    pub duplicates: Vec<DuplicatePair>,
    pub dependencies: Vec<DependencyEdge>,
    pub cycles: Vec<Vec<String>>,
    pub suggestions: Vec<Suggestion>,
    pub notices: Vec<Notice>,
}

impl AnalysisReport {
    pub fn assemble(unit: &SourceUnit, parts: ReportParts) -> Self {
        let complexity = parts.complexity;
        Self {
            total_functions: unit.total_functions(),
            total_classes: unit.total_classes(),
            total_lines: unit.raw.total_lines,
            sloc: unit.raw.sloc,
            comment_lines: unit.raw.comment_lines,
            docstring_lines: unit.raw.docstring_lines,
            blank_lines: unit.raw.blank_lines,
            average_complexity: complexity.average_complexity,
            max_complexity: complexity.max_complexity,
            max_complexity_function: complexity.max_complexity_function,
            maintainability: complexity.maintainability,
            halstead_volume: complexity.halstead_volume,
            cohesion: complexity.cohesion,
            suggestions: parts.suggestions,
            functions: complexity.functions,
            classes: complexity.classes,
            duplicates: parts.duplicates,
            dependencies: parts.dependencies,
            cycles: parts.cycles,
            notices: parts.notices,
        }
    }
}
