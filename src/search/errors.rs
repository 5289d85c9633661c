use thiserror::Error;

/// Errors that abort a planner run before (or instead of) search. Running out
/// of states to expand is not an error, see
/// [`SearchResult`](crate::search::search_engines::SearchResult).
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid task: {0}")]
    InvalidTask(String),
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
    #[error("variable {var} has domain size {domain_size}, which needs {bits} bits to pack")]
    VariableTooLarge {
        var: usize,
        domain_size: usize,
        bits: u32,
    },
    #[error("variable {var} out of range, the task has {num_variables} variables")]
    VariableOutOfRange { var: usize, num_variables: usize },
    #[error("empty pattern")]
    EmptyPattern,
    #[error("pattern {pattern:?} has {size} abstract states, the limit is {max_size}")]
    PatternTooLarge {
        pattern: Vec<usize>,
        size: usize,
        max_size: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
