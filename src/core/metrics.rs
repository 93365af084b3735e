use crate::core::FunctionComplexity;

pub fn calculate_average_complexity(metrics: &[FunctionComplexity]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }

    let total: u32 = metrics.iter().map(|m| m.complexity).sum();
    total as f64 / metrics.len() as f64
}

pub fn find_max_complexity(metrics: &[FunctionComplexity]) -> u32 {
    metrics.iter().map(|m| m.complexity).max().unwrap_or(0)
}

/// First function in declaration order that reaches the maximum
pub fn find_max_complexity_function(metrics: &[FunctionComplexity]) -> Option<&FunctionComplexity> {
    let max = find_max_complexity(metrics);
    metrics.iter().find(|m| m.complexity == max)
}

/// Stable sort, so equal complexities keep declaration order
pub fn sort_by_complexity(mut metrics: Vec<FunctionComplexity>) -> Vec<FunctionComplexity> {
    metrics.sort_by(|a, b| b.complexity.cmp(&a.complexity));
    metrics
}
