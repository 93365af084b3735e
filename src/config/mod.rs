mod loader;
mod thresholds;

use serde::{Deserialize, Serialize};

pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use thresholds::{
    DuplicatesConfig, LimitsConfig, MaintainabilityConfig, ServerConfig, ThresholdsConfig,
};

/// Root configuration, read from `.modmap.toml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModmapConfig {
    #[serde(default)]
    pub thresholds: ThresholdsConfig,

    #[serde(default)]
    pub duplicates: DuplicatesConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub maintainability: MaintainabilityConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl ModmapConfig {
    /// Every out-of-range value, so one run reports all problems
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let t = &self.thresholds;
        let d = &self.duplicates;

        if t.complexity == 0 {
            errors.push("thresholds.complexity must be at least 1".to_string());
        }
        for (field, value) in [
            ("thresholds.maintainability_floor", t.maintainability_floor),
            ("thresholds.maintainability_target", t.maintainability_target),
            ("thresholds.maintainability_high_margin", t.maintainability_high_margin),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(format!("{field} must be within 0-100, got {value}"));
            }
        }
        for (field, value) in [
            ("thresholds.cohesion_floor", t.cohesion_floor),
            ("duplicates.threshold", d.threshold),
            ("duplicates.high_similarity", d.high_similarity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                errors.push(format!("{field} must be within 0.0-1.0, got {value}"));
            }
        }
        if d.threshold == 0.0 {
            errors.push("duplicates.threshold must be greater than 0".to_string());
        }
        if self.limits.max_duplicate_functions < 2 {
            errors.push("limits.max_duplicate_functions must be at least 2".to_string());
        }
        if self.server.timeout_secs == 0 {
            errors.push("server.timeout_secs must be at least 1".to_string());
        }

        errors
    }

    /// Defaults written by `modmap init`
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
