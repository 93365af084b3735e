//! Fixed remediation text for each rule, parameterized only by the
//! evidence that triggered it.

use super::rules::Finding;
use super::{Issue, Step, Suggestion};
use serde_json::{json, Map, Value};

fn step(kind: &str, description: impl Into<String>, details: Value) -> Step {
    let details = match details {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Step {
        kind: kind.to_string(),
        description: description.into(),
        details,
    }
}

fn plain_step(kind: &str, description: &str) -> Step {
    step(kind, description, Value::Null)
}

/// Action name, issue description, steps and estimated impact
type Rendered = (&'static str, String, Vec<Step>, Value);

pub fn render(finding: Finding) -> Suggestion {
    let severity = finding.severity();
    let (action, description, steps, estimated_impact): Rendered = match &finding {
        Finding::ComplexFunctions {
            functions,
            threshold,
        } => (
            "simplify_functions",
            format!(
                "{} functions have high complexity (>{threshold})",
                functions.len()
            ),
            functions
                .iter()
                .map(|f| {
                    let complexity = f.complexity.unwrap_or_default();
                    step(
                        "break_down_function",
                        format!("Break down {} (complexity: {complexity})", f.name),
                        json!({ "function": f.name, "line": f.line, "complexity": complexity }),
                    )
                })
                .collect(),
            json!({
                "functions_affected": functions.len(),
                "average_complexity_reduction": "50-70%",
            }),
        ),

        Finding::LowMaintainability { score, target, .. } => (
            "improve_maintainability",
            format!("Low maintainability index: {score:.2}"),
            vec![
                plain_step(
                    "reduce_complexity",
                    "Simplify complex functions and improve code structure",
                ),
                plain_step("add_documentation", "Add docstrings and comments"),
                plain_step(
                    "improve_naming",
                    "Use more descriptive variable and function names",
                ),
            ],
            json!({ "current_score": score, "target_score": target }),
        ),

        Finding::DuplicateFunctions {
            functions: [first, second],
            similarity,
            lines: [first_lines, second_lines],
            ..
        } => (
            "extract_common_function",
            format!(
                "{first} and {second} are {:.0}% similar",
                similarity * 100.0
            ),
            vec![
                step(
                    "identify_common_code",
                    format!(
                        "Extract the logic shared by {first} and {second} into a helper function"
                    ),
                    json!({ "duplicate_pair": [first, second] }),
                ),
                step(
                    "refactor_duplicates",
                    "Replace both bodies with calls to the helper function",
                    json!({ "count": 2 }),
                ),
            ],
            json!({
                "lines_saved": first_lines.line_count().min(second_lines.line_count()),
                "duplicate_count": 1,
            }),
        ),

        Finding::LowCohesion { classes, floor } => (
            "split_class",
            format!(
                "{} classes have low cohesion (<{floor:.2}): methods do not share state",
                classes.len()
            ),
            classes
                .iter()
                .map(|c| {
                    step(
                        "split_class",
                        format!(
                            "Split {} so each part owns the state its methods use \
                             ({} of {} methods cohesive)",
                            c.name,
                            c.cohesive_methods,
                            c.methods
                        ),
                        json!({ "class": c.name, "line": c.line, "score": c.score }),
                    )
                })
                .collect(),
            json!({
                "classes_affected": classes.len(),
                "cohesion_improvement": "2-3x",
            }),
        ),

        Finding::HighFanOut {
            entities,
            threshold,
        } => (
            "reduce_dependencies",
            format!(
                "{} entities depend on more than {threshold} others",
                entities.len()
            ),
            entities
                .iter()
                .map(|e| {
                    step(
                        "separate_responsibilities",
                        format!(
                            "Split {} ({} outgoing dependencies) into focused units",
                            e.name, e.fan_out
                        ),
                        json!({ "entity": e.name, "fan_out": e.fan_out }),
                    )
                })
                .collect(),
            json!({
                "entities_affected": entities.len(),
                "max_fan_out": entities.iter().map(|e| e.fan_out).max().unwrap_or(0),
            }),
        ),

        Finding::LargeFile {
            metrics,
            modules,
            ..
        } => (
            "split_file",
            format!(
                "File is too large ({} SLOC). Consider splitting.",
                metrics.sloc
            ),
            modules
                .iter()
                .enumerate()
                .map(|(i, module)| {
                    step(
                        "create_module",
                        format!("Extract {} related functions", module.functions.len()),
                        json!({
                            "name": format!("module_{}.py", i + 1),
                            "functions": module.functions,
                        }),
                    )
                })
                .collect(),
            json!({
                "new_files": modules.len(),
                "current_size": metrics.sloc,
                "estimated_new_sizes": modules.iter().map(|m| m.lines).collect::<Vec<_>>(),
            }),
        ),

        Finding::TooManyFunctions { count, .. } => (
            "organize_functions",
            format!("File has {count} functions. Consider organizing into classes or modules."),
            vec![step(
                "group_into_classes",
                "Organize related functions into classes",
                json!({ "function_count": count }),
            )],
            json!({ "current_functions": count, "estimated_classes": count / 5 }),
        ),

        Finding::LongFunctions {
            functions,
            threshold,
        } => (
            "split_long_functions",
            format!(
                "{} functions are too long (>{threshold} lines)",
                functions.len()
            ),
            functions
                .iter()
                .map(|f| {
                    let lines = f.lines.unwrap_or_default();
                    step(
                        "extract_methods",
                        format!("Split {} ({lines} lines) into smaller functions", f.name),
                        json!({ "function": f.name, "line": f.line, "lines": lines }),
                    )
                })
                .collect(),
            json!({
                "functions_affected": functions.len(),
                "estimated_new_functions": functions.len() * 3,
            }),
        ),

        Finding::OrphanFunctions { functions, count } => (
            "review_unused_code",
            format!("{count} functions are never called internally"),
            vec![
                step(
                    "verify_usage",
                    "Verify if these functions are part of public API",
                    json!({ "functions": functions.iter().take(5).collect::<Vec<_>>() }),
                ),
                plain_step(
                    "consider_removal",
                    "Consider removing or documenting as utility functions",
                ),
            ],
            json!({ "functions_to_review": count }),
        ),

        Finding::ProceduralStyle { function_count } => (
            "introduce_classes",
            "Consider using classes to organize related functions".to_string(),
            vec![step(
                "convert_to_oop",
                "Convert related functions into class methods",
                json!({ "function_count": function_count }),
            )],
            json!({ "style_improvement": "Better encapsulation and organization" }),
        ),
    };

    Suggestion {
        action: action.to_string(),
        issue: Issue {
            kind: finding.rule(),
            severity,
            description: Some(description),
            evidence: finding,
        },
        steps,
        estimated_impact,
    }
}
