use std::fs;
use std::path::{Path, PathBuf};

use super::ModmapConfig;
use crate::core::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".modmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse TOML and reject out-of-range values
pub fn parse_and_validate_config(contents: &str) -> Result<ModmapConfig> {
    let config = toml::from_str::<ModmapConfig>(contents)
        .map_err(|e| Error::configuration(format!("Failed to parse {CONFIG_FILE_NAME}: {e}")))?;

    let errors = config.validation_errors();
    if errors.is_empty() {
        Ok(config)
    } else {
        Err(Error::configuration(errors.join("; ")))
    }
}

/// Load an explicitly named config file
pub fn load_config_from(path: &Path) -> Result<ModmapConfig> {
    let contents = fs::read_to_string(path)?;
    parse_and_validate_config(&contents).map_err(|e| match e {
        Error::Configuration { message, .. } => Error::Configuration {
            message,
            path: Some(path.to_path_buf()),
        },
        other => other,
    })
}

/// `start` and its parents, nearest first, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.modmap.toml`. Defaults when none is
/// found; an invalid file is an error rather than silently ignored.
pub fn load_config(start: &Path) -> Result<ModmapConfig> {
    let found = directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|path| path.is_file());

    match found {
        Some(path) => {
            let config = load_config_from(&path)?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            Ok(ModmapConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse_and_validate_config(indoc! {"
            [thresholds]
            complexity = 15

            [duplicates]
            threshold = 0.9
        "})
        .unwrap();
        assert_eq!(config.thresholds.complexity, 15);
        assert_eq!(config.thresholds.large_file_sloc, 500);
        assert_eq!(config.duplicates.threshold, 0.9);
        assert_eq!(config.duplicates.min_tokens, 32);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = parse_and_validate_config("[duplicates]\nthreshold = 2.0\n").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("duplicates.threshold"));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(parse_and_validate_config("[thresholds\n").is_err());
    }

    #[test]
    fn discovers_config_in_ancestor() {
        let root = TempDir::new().unwrap();
        fs::write(
            root.path().join(CONFIG_FILE_NAME),
            "[thresholds]\nfan_out = 3\n",
        )
        .unwrap();
        let nested = root.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = load_config(&nested).unwrap();
        assert_eq!(config.thresholds.fan_out, 3);
    }

    #[test]
    fn invalid_explicit_file_names_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[server]\ntimeout_secs = 0\n").unwrap();
        match load_config_from(&path).unwrap_err() {
            Error::Configuration { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn ancestors_are_bounded() {
        let dirs: Vec<_> = directory_ancestors(PathBuf::from("/a/b/c/d"), 2).collect();
        assert_eq!(dirs, vec![PathBuf::from("/a/b/c/d"), PathBuf::from("/a/b/c")]);
    }
}
