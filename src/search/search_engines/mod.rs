mod best_first_search;
mod eager_search;
mod evaluators;
mod search_engine;
mod search_node;
mod search_space;
mod search_statistics;
mod termination_condition;

pub use best_first_search::BestFirstSearch;
pub use eager_search::EagerSearch;
pub use evaluators::{DeadEndStatus, Evaluators};
pub use search_engine::{
    astar_open_list, greedy_open_list, SearchEngine, SearchEngineName, SearchOptions,
    SearchResult, SearchStatus,
};
pub use search_node::{SearchNode, SearchNodeStatus};
pub use search_space::SearchSpace;
pub use search_statistics::SearchStatistics;
pub use termination_condition::TerminationCondition;
