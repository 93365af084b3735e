pub mod output;

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::Path;

/// Standard-input marker accepted wherever a source path is expected
pub const STDIN_MARKER: &str = "-";

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Reads a path, or all of standard input when the path is `-`
pub fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_MARKER {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read standard input")?;
        return Ok(source);
    }
    read_file(path)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
