use crate::analyzers::function_node;
use crate::config::{DuplicatesConfig, LimitsConfig};
use crate::core::{DuplicatePair, Error, FunctionRecord, Result, SourceUnit};
use crate::debt::normalize::normalized_tokens;
use std::collections::HashMap;

pub const COMPONENT: &str = "duplicate detection";

struct Candidate<'a> {
    function: &'a FunctionRecord,
    tokens: Vec<u32>,
}

/// Pairwise near-duplicate scan over every function and method in
/// declaration order. Each unordered pair is compared once, `i < j`.
///
/// Fails with `ResourceLimitExceeded` when the function count or any body
/// exceeds the configured caps; the caller skips the component.
pub fn detect_duplicates(
    unit: &SourceUnit,
    config: &DuplicatesConfig,
    limits: &LimitsConfig,
) -> Result<Vec<DuplicatePair>> {
    let functions = unit.all_functions();
    if functions.len() > limits.max_duplicate_functions {
        return Err(Error::resource_limit(
            COMPONENT,
            format!(
                "{} functions exceeds the limit of {}",
                functions.len(),
                limits.max_duplicate_functions
            ),
        ));
    }

    let root = unit.tree().root_node();
    let mut interner: HashMap<String, u32> = HashMap::new();
    let mut candidates = Vec::new();

    for function in functions {
        let Some(def) = function_node(root, function) else {
            continue;
        };
        let tokens = normalized_tokens(def, function, &unit.text);
        if tokens.len() > limits.max_body_tokens {
            return Err(Error::resource_limit(
                COMPONENT,
                format!(
                    "{} has {} tokens, limit is {}",
                    function.qualified_name,
                    tokens.len(),
                    limits.max_body_tokens
                ),
            ));
        }
        if tokens.len() < config.min_tokens {
            continue;
        }

        let ids = tokens
            .into_iter()
            .map(|token| {
                let next = interner.len() as u32;
                *interner.entry(token).or_insert(next)
            })
            .collect();
        candidates.push(Candidate {
            function,
            tokens: ids,
        });
    }

    let mut pairs = Vec::new();
    for (i, first) in candidates.iter().enumerate() {
        for second in &candidates[i + 1..] {
            // Property accessors share one qualified name
            if first.function.qualified_name == second.function.qualified_name {
                continue;
            }
            if upper_bound(first.tokens.len(), second.tokens.len()) < config.threshold {
                continue;
            }
            let similarity = similarity_ratio(&first.tokens, &second.tokens);
            if similarity >= config.threshold {
                pairs.push(DuplicatePair {
                    first: first.function.qualified_name.clone(),
                    second: second.function.qualified_name.clone(),
                    similarity,
                    first_lines: first.function.lines,
                    second_lines: second.function.lines,
                });
            }
        }
    }

    log::debug!(
        "Compared {} candidate bodies, {} duplicate pairs",
        candidates.len(),
        pairs.len()
    );
    Ok(pairs)
}

/// Best ratio two sequences of these lengths could reach
fn upper_bound(a: usize, b: usize) -> f64 {
    if a + b == 0 {
        return 1.0;
    }
    2.0 * a.min(b) as f64 / (a + b) as f64
}

/// `2 * LCS / (len_a + len_b)`; two empty sequences are identical
pub fn similarity_ratio<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    2.0 * lcs_length(a, b) as f64 / (a.len() + b.len()) as f64
}

/// Longest common subsequence length with two rolling rows
pub fn lcs_length<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut previous = vec![0usize; short.len() + 1];
    let mut current = vec![0usize; short.len() + 1];

    for x in long {
        for (j, y) in short.iter().enumerate() {
            current[j + 1] = if x == y {
                previous[j] + 1
            } else {
                current[j].max(previous[j + 1])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[short.len()]
}
