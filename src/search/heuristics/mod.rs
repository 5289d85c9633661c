mod blind;
mod cea;
mod cg;
mod cg_cache;
mod domain_transition_graph;
mod goal_count;
mod heuristic;
mod hm;
pub mod landmarks;
pub mod pdbs;

pub use blind::BlindHeuristic;
pub use cea::CeaHeuristic;
pub use cg::CgHeuristic;
pub use domain_transition_graph::{DomainTransitionGraph, DtgTransition};
pub use goal_count::GoalCountHeuristic;
pub use heuristic::{
    Heuristic, HeuristicConfig, HeuristicName, HeuristicValue, PreferredOperators,
};
pub use hm::HmHeuristic;
