use super::{RuleInput, Severity};
use crate::core::metrics::sort_by_complexity;
use crate::core::{ClassCohesion, EdgeKind, LineRange};
use serde::Serialize;

/// The fixed battery, in evaluation order. Ties in severity keep this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    ComplexFunctions,
    LowMaintainability,
    DuplicateFunctions,
    LowCohesion,
    HighFanOut,
    LargeFile,
    TooManyFunctions,
    LongFunctions,
    OrphanFunctions,
    ProceduralStyle,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::ComplexFunctions,
        Rule::LowMaintainability,
        Rule::DuplicateFunctions,
        Rule::LowCohesion,
        Rule::HighFanOut,
        Rule::LargeFile,
        Rule::TooManyFunctions,
        Rule::LongFunctions,
        Rule::OrphanFunctions,
        Rule::ProceduralStyle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::ComplexFunctions => "complex_functions",
            Rule::LowMaintainability => "low_maintainability",
            Rule::DuplicateFunctions => "duplicate_functions",
            Rule::LowCohesion => "low_cohesion",
            Rule::HighFanOut => "high_fan_out",
            Rule::LargeFile => "large_file",
            Rule::TooManyFunctions => "too_many_functions",
            Rule::LongFunctions => "long_functions",
            Rule::OrphanFunctions => "orphan_functions",
            Rule::ProceduralStyle => "procedural_style",
        }
    }

    /// Zero or more findings; only duplicate_functions can fire repeatedly
    pub fn evaluate(&self, input: &RuleInput) -> Vec<Finding> {
        let finding = match self {
            Rule::ComplexFunctions => complex_functions(input),
            Rule::LowMaintainability => low_maintainability(input),
            Rule::DuplicateFunctions => return duplicate_functions(input),
            Rule::LowCohesion => low_cohesion(input),
            Rule::HighFanOut => high_fan_out(input),
            Rule::LargeFile => large_file(input),
            Rule::TooManyFunctions => too_many_functions(input),
            Rule::LongFunctions => long_functions(input),
            Rule::OrphanFunctions => orphan_functions(input),
            Rule::ProceduralStyle => procedural_style(input),
        };
        finding.into_iter().collect()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionFinding {
    pub name: String,
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanOutFinding {
    pub name: String,
    pub fan_out: usize,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetrics {
    pub sloc: usize,
    pub total_lines: usize,
    pub functions: usize,
    pub classes: usize,
}

/// Related functions that could move into a module together
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleCluster {
    pub functions: Vec<String>,
    /// Combined line span of the members
    pub lines: usize,
}

/// Evidence behind one suggestion. Serialized flat into the issue object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Finding {
    ComplexFunctions {
        functions: Vec<FunctionFinding>,
        threshold: u32,
    },
    LowMaintainability {
        score: f64,
        floor: f64,
        #[serde(skip)]
        high_margin: f64,
        #[serde(skip)]
        target: f64,
    },
    DuplicateFunctions {
        functions: [String; 2],
        similarity: f64,
        lines: [LineRange; 2],
        #[serde(skip)]
        high_similarity: f64,
    },
    LowCohesion {
        classes: Vec<ClassCohesion>,
        floor: f64,
    },
    HighFanOut {
        entities: Vec<FanOutFinding>,
        threshold: usize,
    },
    LargeFile {
        metrics: FileMetrics,
        threshold: usize,
        #[serde(skip)]
        modules: Vec<ModuleCluster>,
    },
    TooManyFunctions {
        count: usize,
        threshold: usize,
    },
    LongFunctions {
        functions: Vec<FunctionFinding>,
        threshold: usize,
    },
    OrphanFunctions {
        functions: Vec<String>,
        count: usize,
    },
    ProceduralStyle {
        function_count: usize,
    },
}

impl Finding {
    pub fn rule(&self) -> Rule {
        match self {
            Finding::ComplexFunctions { .. } => Rule::ComplexFunctions,
            Finding::LowMaintainability { .. } => Rule::LowMaintainability,
            Finding::DuplicateFunctions { .. } => Rule::DuplicateFunctions,
            Finding::LowCohesion { .. } => Rule::LowCohesion,
            Finding::HighFanOut { .. } => Rule::HighFanOut,
            Finding::LargeFile { .. } => Rule::LargeFile,
            Finding::TooManyFunctions { .. } => Rule::TooManyFunctions,
            Finding::LongFunctions { .. } => Rule::LongFunctions,
            Finding::OrphanFunctions { .. } => Rule::OrphanFunctions,
            Finding::ProceduralStyle { .. } => Rule::ProceduralStyle,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Finding::ComplexFunctions {
                functions,
                threshold,
            } => {
                let worst = functions.iter().filter_map(|f| f.complexity).max().unwrap_or(0);
                if worst >= threshold.saturating_mul(2) {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            Finding::LowMaintainability {
                score,
                floor,
                high_margin,
                ..
            } => {
                if *score < floor - high_margin {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            Finding::DuplicateFunctions {
                similarity,
                high_similarity,
                ..
            } => {
                if similarity >= high_similarity {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            Finding::LowCohesion { .. } => Severity::Medium,
            Finding::HighFanOut {
                entities,
                threshold,
            } => {
                let worst = entities.iter().map(|e| e.fan_out).max().unwrap_or(0);
                if worst >= threshold.saturating_mul(2) {
                    Severity::High
                } else {
                    Severity::Medium
                }
            }
            Finding::LargeFile { .. } => Severity::High,
            Finding::TooManyFunctions { .. } => Severity::Medium,
            Finding::LongFunctions { .. } => Severity::Medium,
            Finding::OrphanFunctions { .. } => Severity::Low,
            Finding::ProceduralStyle { .. } => Severity::Low,
        }
    }
}

fn complex_functions(input: &RuleInput) -> Option<Finding> {
    let threshold = input.thresholds.complexity;
    let offenders: Vec<_> = input
        .complexity
        .functions
        .iter()
        .filter(|f| f.complexity > threshold)
        .cloned()
        .collect();
    if offenders.is_empty() {
        return None;
    }

    let functions = sort_by_complexity(offenders)
        .into_iter()
        .map(|f| FunctionFinding {
            name: f.name,
            line: f.line,
            complexity: Some(f.complexity),
            lines: None,
        })
        .collect();
    Some(Finding::ComplexFunctions {
        functions,
        threshold,
    })
}

fn low_maintainability(input: &RuleInput) -> Option<Finding> {
    let score = input.complexity.maintainability;
    let floor = input.thresholds.maintainability_floor;
    (score < floor).then(|| Finding::LowMaintainability {
        score,
        floor,
        high_margin: input.thresholds.maintainability_high_margin,
        target: input.thresholds.maintainability_target,
    })
}

fn duplicate_functions(input: &RuleInput) -> Vec<Finding> {
    input
        .duplicates
        .iter()
        .filter(|pair| pair.similarity >= input.duplicate_threshold)
        .map(|pair| Finding::DuplicateFunctions {
            functions: [pair.first.clone(), pair.second.clone()],
            similarity: pair.similarity,
            lines: [pair.first_lines, pair.second_lines],
            high_similarity: input.high_similarity,
        })
        .collect()
}

/// Classes with fewer than two methods have nothing to be cohesive with
fn low_cohesion(input: &RuleInput) -> Option<Finding> {
    let floor = input.thresholds.cohesion_floor;
    let classes: Vec<_> = input
        .complexity
        .classes
        .iter()
        .filter(|c| c.methods >= 2 && c.score < floor)
        .cloned()
        .collect();
    (!classes.is_empty()).then_some(Finding::LowCohesion { classes, floor })
}

fn high_fan_out(input: &RuleInput) -> Option<Finding> {
    let threshold = input.thresholds.fan_out;
    let mut entities: Vec<FanOutFinding> = Vec::new();
    for edge in input.edges() {
        match entities.iter_mut().find(|e| e.name == edge.source) {
            Some(entity) => {
                entity.fan_out += 1;
                entity.targets.push(edge.target.clone());
            }
            None => entities.push(FanOutFinding {
                name: edge.source.clone(),
                fan_out: 1,
                targets: vec![edge.target.clone()],
            }),
        }
    }
    entities.retain(|e| e.fan_out > threshold);
    (!entities.is_empty()).then_some(Finding::HighFanOut {
        entities,
        threshold,
    })
}

fn large_file(input: &RuleInput) -> Option<Finding> {
    let threshold = input.thresholds.large_file_sloc;
    let unit = input.unit;
    if unit.raw.sloc <= threshold {
        return None;
    }

    let functions = unit.all_functions();
    let clusters = match input.dependencies {
        Some(map) => map.clusters.clone(),
        // Without call relations every function stands alone
        None => functions.iter().map(|f| vec![f.qualified_name.clone()]).collect(),
    };
    let modules = clusters
        .into_iter()
        .map(|members| {
            let lines = functions
                .iter()
                .filter(|f| members.contains(&f.qualified_name))
                .map(|f| f.lines.line_count())
                .sum();
            ModuleCluster {
                functions: members,
                lines,
            }
        })
        .collect();

    Some(Finding::LargeFile {
        metrics: FileMetrics {
            sloc: unit.raw.sloc,
            total_lines: unit.raw.total_lines,
            functions: unit.total_functions(),
            classes: unit.total_classes(),
        },
        threshold,
        modules,
    })
}

fn too_many_functions(input: &RuleInput) -> Option<Finding> {
    let threshold = input.thresholds.max_functions;
    let count = input.unit.total_functions();
    (count > threshold).then_some(Finding::TooManyFunctions { count, threshold })
}

fn long_functions(input: &RuleInput) -> Option<Finding> {
    let threshold = input.thresholds.long_function_lines;
    let functions: Vec<_> = input
        .unit
        .all_functions()
        .into_iter()
        .filter(|f| f.lines.line_count() > threshold)
        .map(|f| FunctionFinding {
            name: f.qualified_name.clone(),
            line: f.lines.start,
            complexity: None,
            lines: Some(f.lines.line_count()),
        })
        .collect();
    (!functions.is_empty()).then_some(Finding::LongFunctions {
        functions,
        threshold,
    })
}

/// Entry points and test functions are expected to have no internal callers
fn is_orphan_candidate(name: &str) -> bool {
    let dunder = name.starts_with("__") && name.ends_with("__");
    !name.starts_with('_') && !dunder && name != "main" && !name.starts_with("test_")
}

/// Needs the dependency map; without it every function would look uncalled
fn orphan_functions(input: &RuleInput) -> Option<Finding> {
    let dependencies = input.dependencies?;
    let functions: Vec<String> = input
        .unit
        .functions
        .iter()
        .filter(|f| is_orphan_candidate(&f.name))
        .filter(|f| {
            !dependencies
                .edges
                .iter()
                .any(|e| e.kind == EdgeKind::Call && e.target == f.qualified_name)
        })
        .map(|f| f.qualified_name.clone())
        .collect();
    (functions.len() > input.thresholds.orphan_functions).then(|| Finding::OrphanFunctions {
        count: functions.len(),
        functions,
    })
}

fn procedural_style(input: &RuleInput) -> Option<Finding> {
    let function_count = input.unit.total_functions();
    (input.unit.total_classes() == 0 && function_count > input.thresholds.procedural_functions)
        .then_some(Finding::ProceduralStyle { function_count })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_names_match_serialization() {
        for rule in Rule::ALL {
            let json = serde_json::to_value(rule).unwrap();
            assert_eq!(json, serde_json::Value::String(rule.as_str().to_string()));
        }
    }

    #[test]
    fn complexity_severity_doubles_at_twice_threshold() {
        let finding = |complexity| Finding::ComplexFunctions {
            functions: vec![FunctionFinding {
                name: "f".into(),
                line: 1,
                complexity: Some(complexity),
                lines: None,
            }],
            threshold: 10,
        };
        assert_eq!(finding(11).severity(), Severity::Medium);
        assert_eq!(finding(19).severity(), Severity::Medium);
        assert_eq!(finding(20).severity(), Severity::High);
    }

    #[test]
    fn duplicate_severity_follows_similarity() {
        let finding = |similarity| Finding::DuplicateFunctions {
            functions: ["a".into(), "b".into()],
            similarity,
            lines: [LineRange::new(1, 2), LineRange::new(4, 5)],
            high_similarity: 0.95,
        };
        assert_eq!(finding(0.9).severity(), Severity::Medium);
        assert_eq!(finding(0.95).severity(), Severity::High);
        assert_eq!(finding(1.0).rule(), Rule::DuplicateFunctions);
    }

    #[test]
    fn orphan_candidates_skip_entry_points() {
        assert!(is_orphan_candidate("load"));
        assert!(!is_orphan_candidate("_helper"));
        assert!(!is_orphan_candidate("__init__"));
        assert!(!is_orphan_candidate("main"));
        assert!(!is_orphan_candidate("test_load"));
    }
}
