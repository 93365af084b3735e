//! Maintainability index, SEI variant with the comment term.
//!
//! ```text
//! MI = 171 - 5.2 ln(V) - 0.23 G - 16.2 ln(L) + 50 sin(sqrt(2.46 C))
//! ```
//!
//! rescaled by `100 / 171` and clamped to `[0, 100]`. `V` is the Halstead
//! volume, `G` the average cyclomatic complexity, `L` the SLOC count and `C`
//! the comment percentage converted to radians.

pub const MI_MAX: f64 = 100.0;
pub const MI_MIN: f64 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaintainabilityInputs {
    pub halstead_volume: f64,
    pub average_complexity: f64,
    pub sloc: usize,
    /// Comment and docstring lines over non-blank lines, 0-100
    pub comment_percentage: f64,
}

pub fn maintainability_index(inputs: &MaintainabilityInputs, count_comments: bool) -> f64 {
    if inputs.halstead_volume <= 0.0 || inputs.sloc == 0 {
        return MI_MAX;
    }

    let comment_term = if count_comments {
        let radians = inputs.comment_percentage.to_radians();
        50.0 * (2.46 * radians).sqrt().sin()
    } else {
        0.0
    };

    let raw = 171.0
        - 5.2 * inputs.halstead_volume.ln()
        - 0.23 * inputs.average_complexity
        - 16.2 * (inputs.sloc as f64).ln()
        + comment_term;

    (raw * 100.0 / 171.0).clamp(MI_MIN, MI_MAX)
}
