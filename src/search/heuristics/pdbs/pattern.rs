use crate::search::{PlannerError, Result, Task};
use tracing::warn;

/// A sorted, duplicate-free list of variables.
pub type Pattern = Vec<usize>;

pub type PatternCollection = Vec<Pattern>;

/// Sorts and deduplicates the pattern and checks its variables.
pub fn validate_and_normalize_pattern(task: &Task, pattern: &[usize]) -> Result<Pattern> {
    if pattern.is_empty() {
        return Err(PlannerError::EmptyPattern);
    }
    let mut normalized = pattern.to_vec();
    normalized.sort_unstable();
    normalized.dedup();
    if normalized.len() != pattern.len() {
        warn!(?pattern, "duplicate variables in pattern");
    }
    if let Some(&var) = normalized.last() {
        if var >= task.num_variables() {
            return Err(PlannerError::VariableOutOfRange {
                var,
                num_variables: task.num_variables(),
            });
        }
    }
    Ok(normalized)
}

/// Normalizes every pattern and drops duplicate patterns. An empty
/// collection becomes one singleton pattern per goal variable.
pub fn validate_and_normalize_patterns(
    task: &Task,
    patterns: &[Pattern],
) -> Result<PatternCollection> {
    if patterns.is_empty() {
        return Ok(goal_variable_patterns(task));
    }
    let mut normalized: PatternCollection = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let pattern = validate_and_normalize_pattern(task, pattern)?;
        if normalized.contains(&pattern) {
            warn!(?pattern, "duplicate pattern in collection");
        } else {
            normalized.push(pattern);
        }
    }
    Ok(normalized)
}

pub fn goal_variable_patterns(task: &Task) -> PatternCollection {
    task.goal.iter().map(|fact| vec![fact.var]).collect()
}

/// `result[v1][v2]` is false iff some operator has effects on both `v1` and
/// `v2`. A variable with an effect is not additive with itself.
pub fn compute_additive_vars(task: &Task) -> Vec<Vec<bool>> {
    let num_variables = task.num_variables();
    let mut are_additive = vec![vec![true; num_variables]; num_variables];
    for op in &task.operators {
        for e1 in &op.effects {
            for e2 in &op.effects {
                are_additive[e1.fact.var][e2.fact.var] = false;
            }
        }
    }
    are_additive
}

/// Two patterns are additive if every pair of variables across them is.
pub fn are_patterns_additive(
    pattern1: &[usize],
    pattern2: &[usize],
    are_additive: &[Vec<bool>],
) -> bool {
    pattern1
        .iter()
        .all(|&v1| pattern2.iter().all(|&v2| are_additive[v1][v2]))
}
