pub mod cohesion;
pub mod cyclomatic;
pub mod halstead;
pub mod maintainability;

use crate::analyzers::{function_node, node_text, preorder, start_line};
use crate::config::MaintainabilityConfig;
use crate::core::metrics::{
    calculate_average_complexity, find_max_complexity, find_max_complexity_function,
};
use crate::core::{ComplexityReport, Error, FunctionComplexity, Notice, SourceUnit};
use cyclomatic::calculate_cyclomatic;
use maintainability::{maintainability_index, MaintainabilityInputs};
use tree_sitter::Node;

pub const COMPONENT: &str = "complexity";

/// Scores every function and method of `unit`, plus file-level
/// maintainability and cohesion. Never fails on a parsed unit; constructs the
/// scorer does not model come back as notices.
pub fn score(unit: &SourceUnit, config: &MaintainabilityConfig) -> (ComplexityReport, Vec<Notice>) {
    let root = unit.tree().root_node();
    let notices: Vec<Notice> = unmodeled_constructs(root, &unit.text)
        .iter()
        .filter_map(|error| {
            log::warn!("{error}");
            Notice::from_error(COMPONENT, error)
        })
        .collect();

    let functions: Vec<FunctionComplexity> = unit
        .all_functions()
        .into_iter()
        .map(|function| {
            let complexity = function_node(root, function).map_or(1, calculate_cyclomatic);
            FunctionComplexity {
                name: function.qualified_name.clone(),
                line: function.lines.start,
                complexity,
            }
        })
        .collect();

    let average_complexity = calculate_average_complexity(&functions);
    let halstead = halstead::calculate_halstead(root, &unit.text);
    let maintainability = maintainability_index(
        &MaintainabilityInputs {
            halstead_volume: halstead.volume(),
            average_complexity,
            sloc: unit.raw.sloc,
            comment_percentage: unit.raw.comment_percentage(),
        },
        config.count_comments,
    );

    let classes: Vec<_> = unit.classes.iter().map(cohesion::class_cohesion).collect();
    let file_cohesion = cohesion::file_cohesion(&classes);

    log::debug!(
        "Scored {} functions: average {:.2}, MI {:.1}",
        functions.len(),
        average_complexity,
        maintainability
    );

    let report = ComplexityReport {
        average_complexity,
        max_complexity: find_max_complexity(&functions),
        max_complexity_function: find_max_complexity_function(&functions).map(|f| f.name.clone()),
        halstead_volume: halstead.volume(),
        maintainability,
        classes,
        cohesion: file_cohesion,
        functions,
    };

    (report, notices)
}

/// Classes declared directly in a class body. Their methods are neither
/// recorded nor scored; a class nested in a function body is part of that
/// function's walk and needs no notice.
fn unmodeled_constructs(root: Node, source: &str) -> Vec<Error> {
    preorder(root)
        .filter(|node| node.kind() == "class_definition")
        .filter(|node| enclosing_definition(*node).is_some_and(|d| d.kind() == "class_definition"))
        .map(|node| {
            let name = node
                .child_by_field_name("name")
                .map(|n| node_text(n, source))
                .unwrap_or_default();
            Error::unsupported(format!("nested class {name}"), start_line(node))
        })
        .collect()
}

fn enclosing_definition(node: Node) -> Option<Node> {
    let mut current = node.parent()?;
    loop {
        if matches!(current.kind(), "class_definition" | "function_definition") {
            return Some(current);
        }
        current = current.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::build_source_unit;
    use crate::complexity::maintainability::MI_MAX;
    use crate::core::NoticeKind;
    use indoc::indoc;

    fn score_source(source: &str) -> (ComplexityReport, Vec<Notice>) {
        let unit = build_source_unit(source).unwrap();
        score(&unit, &MaintainabilityConfig::default())
    }

    #[test]
    fn empty_file_scores_maximum() {
        let (report, notices) = score_source("");
        assert!(report.functions.is_empty());
        assert_eq!(report.average_complexity, 0.0);
        assert_eq!(report.max_complexity, 0);
        assert_eq!(report.max_complexity_function, None);
        assert_eq!(report.maintainability, MI_MAX);
        assert_eq!(report.cohesion, None);
        assert!(notices.is_empty());
    }

    #[test]
    fn one_entry_per_function_in_declaration_order() {
        let (report, _) = score_source(indoc! {"
            def a(x):
                if x:
                    return 1
                return 0

            class K:
                def m(self, y):
                    return y or 0

            def b():
                pass
        "});
        let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "K.m", "b"]);
        let values: Vec<_> = report.functions.iter().map(|f| f.complexity).collect();
        assert_eq!(values, vec![2, 2, 1]);
        assert_eq!(report.max_complexity, 2);
        assert_eq!(report.max_complexity_function.as_deref(), Some("a"));
        assert!(report.cohesion.is_some());
    }

    #[test]
    fn class_nested_in_class_becomes_notice() {
        let (report, notices) = score_source(indoc! {"
            class Outer:
                class Meta:
                    def option(self):
                        return 1

                def run(self):
                    return 2
        "});
        let names: Vec<_> = report.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Outer.run"]);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NoticeKind::UnsupportedConstruct);
        assert_eq!(notices[0].component, COMPONENT);
        assert!(notices[0].message.contains("nested class Meta at line 2"));
    }

    #[test]
    fn class_nested_in_function_is_scored_with_it() {
        let (report, notices) = score_source(indoc! {"
            def factory(flag):
                class Local:
                    def pick(self):
                        return 1 if flag else 2
                return Local
        "});
        assert_eq!(report.functions[0].complexity, 2);
        assert!(notices.is_empty());
    }

    #[test]
    fn with_complexity_fills_records() {
        let unit = build_source_unit("def f(a):\n    return a and 1\n").unwrap();
        let (report, _) = score(&unit, &MaintainabilityConfig::default());
        let scored = unit.with_complexity(&report);
        assert_eq!(scored.functions[0].complexity, Some(2));
    }
}
