use crate::io::output::OutputFormat;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "modmap")]
#[command(about = "Python modularity and maintainability analyzer", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to the nearest .modmap.toml)
    #[arg(long, global = true, env = "MODMAP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze one Python source file
    Analyze {
        /// File to analyze, or `-` for standard input
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cyclomatic complexity above which a function is flagged
        #[arg(long)]
        threshold_complexity: Option<u32>,

        /// Similarity ratio at which two functions count as duplicates
        #[arg(long)]
        threshold_duplicate: Option<f64>,
    },

    /// Serve the analyzer over HTTP
    Serve {
        /// Listen address (defaults to the configured server address)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Write a default .modmap.toml in the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
