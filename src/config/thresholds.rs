use serde::{Deserialize, Serialize};

/// Trigger points for the suggestion rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Cyclomatic complexity above which a function is "complex"
    #[serde(default = "default_complexity")]
    pub complexity: u32,

    /// Maintainability index below which the file is flagged
    #[serde(default = "default_maintainability_floor")]
    pub maintainability_floor: f64,

    /// Distance below the floor at which the finding becomes high severity
    #[serde(default = "default_maintainability_high_margin")]
    pub maintainability_high_margin: f64,

    /// Score suggested as the refactoring target
    #[serde(default = "default_maintainability_target")]
    pub maintainability_target: f64,

    #[serde(default = "default_cohesion_floor")]
    pub cohesion_floor: f64,

    /// Outgoing dependency edges allowed per entity
    #[serde(default = "default_fan_out")]
    pub fan_out: usize,

    #[serde(default = "default_large_file_sloc")]
    pub large_file_sloc: usize,

    #[serde(default = "default_max_functions")]
    pub max_functions: usize,

    #[serde(default = "default_long_function_lines")]
    pub long_function_lines: usize,

    #[serde(default = "default_orphan_functions")]
    pub orphan_functions: usize,

    /// Function count above which a class-free file is "procedural"
    #[serde(default = "default_procedural_functions")]
    pub procedural_functions: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            complexity: default_complexity(),
            maintainability_floor: default_maintainability_floor(),
            maintainability_high_margin: default_maintainability_high_margin(),
            maintainability_target: default_maintainability_target(),
            cohesion_floor: default_cohesion_floor(),
            fan_out: default_fan_out(),
            large_file_sloc: default_large_file_sloc(),
            max_functions: default_max_functions(),
            long_function_lines: default_long_function_lines(),
            orphan_functions: default_orphan_functions(),
            procedural_functions: default_procedural_functions(),
        }
    }
}

fn default_complexity() -> u32 {
    10
}
fn default_maintainability_floor() -> f64 {
    65.0
}
fn default_maintainability_high_margin() -> f64 {
    20.0
}
fn default_maintainability_target() -> f64 {
    75.0
}
fn default_cohesion_floor() -> f64 {
    0.5
}
fn default_fan_out() -> usize {
    10
}
fn default_large_file_sloc() -> usize {
    500
}
fn default_max_functions() -> usize {
    20
}
fn default_long_function_lines() -> usize {
    50
}
fn default_orphan_functions() -> usize {
    5
}
fn default_procedural_functions() -> usize {
    15
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatesConfig {
    /// Minimum similarity ratio reported as a duplicate pair
    #[serde(default = "default_similarity_threshold")]
    pub threshold: f64,

    /// Similarity at or above which a pair is high severity
    #[serde(default = "default_high_similarity")]
    pub high_similarity: f64,

    /// Bodies with fewer normalized tokens are never compared
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
}

impl Default for DuplicatesConfig {
    fn default() -> Self {
        Self {
            threshold: default_similarity_threshold(),
            high_similarity: default_high_similarity(),
            min_tokens: default_min_tokens(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.85
}
fn default_high_similarity() -> f64 {
    0.95
}
fn default_min_tokens() -> usize {
    32
}

/// Caps beyond which a component is skipped with a notice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_duplicate_functions")]
    pub max_duplicate_functions: usize,

    #[serde(default = "default_max_body_tokens")]
    pub max_body_tokens: usize,

    #[serde(default = "default_max_entities")]
    pub max_entities: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_duplicate_functions: default_max_duplicate_functions(),
            max_body_tokens: default_max_body_tokens(),
            max_entities: default_max_entities(),
        }
    }
}

fn default_max_duplicate_functions() -> usize {
    400
}
fn default_max_body_tokens() -> usize {
    4000
}
fn default_max_entities() -> usize {
    2000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintainabilityConfig {
    /// Include the comment-percentage term of the index
    #[serde(default = "default_count_comments")]
    pub count_comments: bool,
}

impl Default for MaintainabilityConfig {
    fn default() -> Self {
        Self {
            count_comments: default_count_comments(),
        }
    }
}

fn default_count_comments() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Wall-clock budget for one analysis request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_addr() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
