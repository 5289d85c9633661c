//! Pattern database heuristics: single projections, canonical combinations
//! of pattern collections, zero-one cost partitioning and pattern
//! collections found by hill climbing.

mod canonical_pdbs;
mod dominance_pruning;
mod hill_climbing;
mod match_tree;
mod pattern;
mod pattern_database;
mod pdb_heuristic;
mod random_walk;
mod zero_one_pdbs;

pub use canonical_pdbs::{CanonicalPdbs, CanonicalPdbsHeuristic};
pub use dominance_pruning::prune_dominated_subsets;
pub use hill_climbing::{HillClimbingConfig, PatternCollectionHillClimbing};
pub use match_tree::MatchTree;
pub use pattern::{
    are_patterns_additive, compute_additive_vars, goal_variable_patterns,
    validate_and_normalize_pattern, validate_and_normalize_patterns, Pattern, PatternCollection,
};
pub use pattern_database::{PatternDatabase, MAX_PDB_SIZE};
pub use pdb_heuristic::PdbHeuristic;
pub use random_walk::RandomWalkSampler;
pub use zero_one_pdbs::ZeroOnePdbs;
