use crate::analyzers::build_source_unit;
use crate::complexity;
use crate::config::ModmapConfig;
use crate::core::{Notice, Result};
use crate::debt::{dependency_graph, duplication, DependencyGraph, DependencyMap};
use crate::report::{AnalysisReport, ReportParts};
use crate::suggestions::{generate_suggestions, RuleInput};

/// Source text in, report out. A `SyntaxError` aborts before anything is
/// built; resource caps and unsupported constructs degrade to notices.
pub fn analyze_source(source: &str, config: &ModmapConfig) -> Result<AnalysisReport> {
    let unit = build_source_unit(source)?;
    log::debug!(
        "Parsed {} lines, {} functions, {} classes",
        unit.raw.total_lines,
        unit.total_functions(),
        unit.total_classes()
    );

    let (complexity, mut notices) = complexity::score(&unit, &config.maintainability);
    let unit = unit.with_complexity(&complexity);

    let duplicates = recover(
        duplication::detect_duplicates(&unit, &config.duplicates, &config.limits),
        duplication::COMPONENT,
        &mut notices,
    )?
    .unwrap_or_default();

    let dependency_map = recover(
        DependencyGraph::build(&unit, config.limits.max_entities),
        dependency_graph::COMPONENT,
        &mut notices,
    )?
    .map(|graph| graph.summarize(&unit));

    let suggestions = generate_suggestions(&RuleInput::new(
        &unit,
        &complexity,
        &duplicates,
        dependency_map.as_ref(),
        &config.thresholds,
        &config.duplicates,
    ));
    let DependencyMap {
        edges: dependencies,
        cycles,
        ..
    } = dependency_map.unwrap_or_default();

    Ok(AnalysisReport::assemble(
        &unit,
        ReportParts {
            complexity,
            duplicates,
            dependencies,
            cycles,
            suggestions,
            notices,
        },
    ))
}

/// Recoverable errors become notices and the component's output is dropped
fn recover<T>(result: Result<T>, component: &str, notices: &mut Vec<Notice>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error) => match Notice::from_error(component, &error) {
            Some(notice) => {
                log::warn!("{error}");
                notices.push(notice);
                Ok(None)
            }
            None => Err(error),
        },
    }
}
