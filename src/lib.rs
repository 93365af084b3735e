// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod complexity;
pub mod config;
pub mod core;
pub mod debt;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod server;
pub mod suggestions;

// Re-export commonly used types
pub use crate::core::{
    ClassCohesion, ComplexityReport, DependencyEdge, DuplicatePair, EdgeKind, Error,
    FunctionComplexity, Notice, NoticeKind, Result, SourceUnit,
};

pub use crate::core::metrics::{calculate_average_complexity, find_max_complexity};

pub use crate::config::ModmapConfig;

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};

pub use crate::pipeline::analyze_source;

pub use crate::report::AnalysisReport;

pub use crate::suggestions::{Rule, Severity, Suggestion};
