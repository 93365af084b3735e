use crate::config::ModmapConfig;
use crate::core::Error;
use crate::io::output::{create_writer, OutputFormat};
use crate::io::read_source;
use crate::pipeline::analyze_source;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::ExitCode;

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub threshold_complexity: Option<u32>,
    pub threshold_duplicate: Option<f64>,
}

/// Command-line overrides applied over the file configuration
pub fn apply_overrides(mut config: ModmapConfig, args: &AnalyzeConfig) -> Result<ModmapConfig> {
    if let Some(complexity) = args.threshold_complexity {
        config.thresholds.complexity = complexity;
    }
    if let Some(threshold) = args.threshold_duplicate {
        config.duplicates.threshold = threshold;
    }
    let errors = config.validation_errors();
    if !errors.is_empty() {
        anyhow::bail!("Invalid thresholds: {}", errors.join("; "));
    }
    Ok(config)
}

/// Exits with status 1 when the input is not valid Python
pub fn analyze_file(args: AnalyzeConfig, config: ModmapConfig) -> Result<ExitCode> {
    let config = apply_overrides(config, &args)?;
    let source = read_source(&args.path)?;

    let report = match analyze_source(&source, &config) {
        Ok(report) => report,
        Err(error @ Error::Syntax { .. }) => {
            eprintln!("{}: {error}", args.path.display());
            return Ok(ExitCode::from(1));
        }
        Err(error) => {
            return Err(error).with_context(|| format!("Failed to analyze {}", args.path.display()))
        }
    };

    let sink: Box<dyn std::io::Write> = match &args.output {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let mut writer = create_writer(args.format, sink);
    writer.write_report(&report)?;

    Ok(ExitCode::SUCCESS)
}
