//! Command implementations behind the `modmap` binary.

pub mod analyze;
pub mod init;
pub mod serve;

use crate::config::{load_config, load_config_from, ModmapConfig};
use anyhow::{Context, Result};
use std::path::Path;

/// An explicit `--config` path wins; otherwise the nearest `.modmap.toml`
/// above the working directory, or defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<ModmapConfig> {
    match explicit {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Invalid configuration in {}", path.display())),
        None => {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            load_config(&cwd).context("Invalid configuration")
        }
    }
}
