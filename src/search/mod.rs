pub mod algorithms;
mod causal_graph;
pub mod config;
mod errors;
mod fact;
pub mod heuristics;
pub mod open_lists;
mod operator;
mod operator_cost;
mod plan;
pub mod search_engines;
pub mod states;
pub mod successor_generators;
mod task;
mod variable;
mod verbosity;

pub use causal_graph::CausalGraph;
pub use errors::{PlannerError, Result};
pub use fact::Fact;
pub use operator::{Effect, Operator, OperatorId};
pub use operator_cost::{Cost, OperatorCost, INFINITE_COST};
pub use plan::Plan;
pub use task::Task;
pub use variable::Variable;
pub use verbosity::Verbosity;
