use crate::report::AnalysisReport;
use crate::suggestions::{Severity, Suggestion};
use colored::*;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        self.writer.write_all(json.as_bytes())?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_header(&mut self) -> anyhow::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", RULE.blue())?;
        writeln!(self.writer, "{}", "           MODMAP ANALYSIS REPORT".bold().blue())?;
        writeln!(self.writer, "{}", RULE.blue())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{} Summary", "FILE".bold())?;
        writeln!(self.writer, "{THIN_RULE}")?;
        writeln!(
            self.writer,
            "  Lines:               {} ({} SLOC, {} comment, {} docstring, {} blank)",
            report.total_lines,
            report.sloc,
            report.comment_lines,
            report.docstring_lines,
            report.blank_lines
        )?;
        writeln!(self.writer, "  Functions:           {}", report.total_functions)?;
        writeln!(self.writer, "  Classes:             {}", report.total_classes)?;
        writeln!(
            self.writer,
            "  Average complexity:  {:.2}",
            report.average_complexity
        )?;
        match &report.max_complexity_function {
            Some(name) => writeln!(
                self.writer,
                "  Max complexity:      {} ({name})",
                report.max_complexity
            )?,
            None => writeln!(self.writer, "  Max complexity:      {}", report.max_complexity)?,
        }
        writeln!(
            self.writer,
            "  Maintainability:     {}",
            format_maintainability(report.maintainability)
        )?;
        if let Some(cohesion) = report.cohesion {
            writeln!(self.writer, "  Cohesion:            {cohesion:.2}")?;
        }
        writeln!(
            self.writer,
            "  Dependencies:        {} edges, {} duplicate pairs",
            report.dependencies.len(),
            report.duplicates.len()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_cycles(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        if report.cycles.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "{}", "DEPENDENCY CYCLES".bold())?;
        writeln!(self.writer, "{THIN_RULE}")?;
        for cycle in &report.cycles {
            writeln!(self.writer, "  {}", cycle.join(" -> "))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_suggestions(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", "SUGGESTIONS".bold())?;
        writeln!(self.writer, "{THIN_RULE}")?;
        if report.suggestions.is_empty() {
            writeln!(self.writer, "  {}", "No refactoring suggested".green())?;
        }
        for (i, suggestion) in report.suggestions.iter().enumerate() {
            self.write_suggestion(i + 1, suggestion)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_suggestion(&mut self, rank: usize, suggestion: &Suggestion) -> anyhow::Result<()> {
        let issue = &suggestion.issue;
        writeln!(
            self.writer,
            "  {rank}. [{}] {}: {}",
            format_severity(issue.severity),
            suggestion.action.bold(),
            issue.description.as_deref().unwrap_or(issue.kind.as_str())
        )?;
        for step in &suggestion.steps {
            writeln!(self.writer, "     - {}", step.description)?;
        }
        Ok(())
    }

    fn write_notices(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        for notice in &report.notices {
            writeln!(
                self.writer,
                "{} {}: {}",
                "note:".yellow(),
                notice.component,
                notice.message
            )?;
        }
        Ok(())
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        self.write_header()?;
        self.write_summary(report)?;
        self.write_cycles(report)?;
        self.write_suggestions(report)?;
        self.write_notices(report)?;
        Ok(())
    }
}

const RULE: &str = "═══════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────";

fn format_severity(severity: Severity) -> ColoredString {
    let label = severity.to_string().to_uppercase();
    match severity {
        Severity::High => label.red().bold(),
        Severity::Medium => label.yellow(),
        Severity::Low => label.normal(),
    }
}

fn format_maintainability(score: f64) -> ColoredString {
    let text = format!("{score:.2}");
    match score {
        s if s < 40.0 => text.red(),
        s if s < 65.0 => text.yellow(),
        _ => text.green(),
    }
}

pub fn create_writer(format: OutputFormat, writer: Box<dyn Write>) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModmapConfig;
    use crate::pipeline::analyze_source;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {"
        import os

        def main():
            if os.getenv('X'):
                return 1
            return 0
    "};

    #[test]
    fn json_output_is_the_serialized_report() {
        let report = analyze_source(SAMPLE, &ModmapConfig::default()).unwrap();
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer).write_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["total_functions"], 1);
        assert_eq!(value["max_complexity"], 2);
        assert_eq!(value["max_complexity_function"], "main");
    }

    #[test]
    fn terminal_output_lists_summary() {
        colored::control::set_override(false);
        let report = analyze_source(SAMPLE, &ModmapConfig::default()).unwrap();
        let mut buffer = Vec::new();
        TerminalWriter::new(&mut buffer).write_report(&report).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("MODMAP ANALYSIS REPORT"));
        assert!(text.contains("Functions:           1"));
        assert!(text.contains("Max complexity:      2 (main)"));
        assert!(text.contains("No refactoring suggested"));
    }
}
