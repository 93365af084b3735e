pub mod rules;
pub mod templates;

use crate::config::{DuplicatesConfig, ThresholdsConfig};
use crate::core::{ComplexityReport, DependencyEdge, DuplicatePair, SourceUnit};
use crate::debt::DependencyMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub use rules::{Finding, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display_str = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        write!(f, "{display_str}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: Rule,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub evidence: Finding,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub action: String,
    pub issue: Issue,
    pub steps: Vec<Step>,
    pub estimated_impact: serde_json::Value,
}

/// Everything the rule battery reads
pub struct RuleInput<'a> {
    pub unit: &'a SourceUnit,
    pub complexity: &'a ComplexityReport,
    pub duplicates: &'a [DuplicatePair],
    /// `None` when dependency mapping was skipped
    pub dependencies: Option<&'a DependencyMap>,
    pub thresholds: &'a ThresholdsConfig,
    pub duplicate_threshold: f64,
    pub high_similarity: f64,
}

impl<'a> RuleInput<'a> {
    pub fn new(
        unit: &'a SourceUnit,
        complexity: &'a ComplexityReport,
        duplicates: &'a [DuplicatePair],
        dependencies: Option<&'a DependencyMap>,
        thresholds: &'a ThresholdsConfig,
        duplicate_config: &DuplicatesConfig,
    ) -> Self {
        Self {
            unit,
            complexity,
            duplicates,
            dependencies,
            thresholds,
            duplicate_threshold: duplicate_config.threshold,
            high_similarity: duplicate_config.high_similarity,
        }
    }

    /// Dependency edges, empty when mapping was skipped
    pub fn edges(&self) -> &'a [DependencyEdge] {
        match self.dependencies {
            Some(map) => &map.edges,
            None => &[],
        }
    }
}

/// Runs every rule in evaluation order, then orders by descending severity.
/// The sort is stable, so equal severities keep rule order.
pub fn generate_suggestions(input: &RuleInput) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Rule::ALL
        .iter()
        .flat_map(|rule| rule.evaluate(input))
        .map(templates::render)
        .collect();
    suggestions.sort_by_key(|s| Reverse(s.issue.severity));

    log::debug!("Generated {} suggestions", suggestions.len());
    suggestions
}
