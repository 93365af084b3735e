use anyhow::Result;
use clap::Parser;
use modmap::cli::{Cli, Commands};
use modmap::commands::{self, analyze::AnalyzeConfig};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = commands::resolve_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            threshold_complexity,
            threshold_duplicate,
        } => commands::analyze::analyze_file(
            AnalyzeConfig {
                path,
                format,
                output,
                threshold_complexity,
                threshold_duplicate,
            },
            config,
        ),
        Commands::Serve { addr } => {
            commands::serve::serve_http(addr, config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::init_config(&std::env::current_dir()?, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// RUST_LOG takes precedence over -v flags
fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(cli.log_level());
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None).init();
}
