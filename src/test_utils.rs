use crate::search::{
    heuristics::{Heuristic, HeuristicValue},
    states::State,
    Cost, OperatorCost, Task, INFINITE_COST,
};
use std::collections::{HashMap, HashSet, VecDeque};

pub const BLOCKS_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/blocks.sas"
));

pub const GRID_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/grid.sas"
));

pub const TRUCK_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/truck.sas"
));

pub const SWITCH_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/switch.sas"
));

pub const DEAD_END_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/dead_end.sas"
));

pub const UNSOLVABLE_SAS_TEXT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/benchmarks/sas/unsolvable.sas"
));

/// Every assignment of values to the task's variables, in lexicographic
/// order.
pub fn all_states(task: &Task) -> Vec<Vec<usize>> {
    let mut states = vec![vec![]];
    for var in 0..task.num_variables() {
        states = states
            .into_iter()
            .flat_map(|prefix| {
                (0..task.domain_size(var)).map(move |value| {
                    let mut state = prefix.clone();
                    state.push(value);
                    state
                })
            })
            .collect();
    }
    states
}

/// The states reachable from the initial state, in breadth-first order.
pub fn reachable_states(task: &Task) -> Vec<Vec<usize>> {
    let mut seen = HashSet::from([task.initial_state.clone()]);
    let mut queue = VecDeque::from([task.initial_state.clone()]);
    let mut order = vec![];
    while let Some(values) = queue.pop_front() {
        for op in &task.operators {
            if op.is_applicable(&values) {
                let successor = op.apply(&values);
                if seen.insert(successor.clone()) {
                    queue.push_back(successor);
                }
            }
        }
        order.push(values);
    }
    order
}

/// Exact goal distances of all states under the given cost type, by value
/// iteration. Unsolvable states map to [`INFINITE_COST`].
pub fn goal_distances(task: &Task, cost_type: OperatorCost) -> HashMap<Vec<usize>, Cost> {
    let states = all_states(task);
    let mut distances: HashMap<Vec<usize>, Cost> = states
        .iter()
        .map(|values| {
            let h = if task.is_goal(values) { 0 } else { INFINITE_COST };
            (values.clone(), h)
        })
        .collect();
    let mut changed = true;
    while changed {
        changed = false;
        for values in &states {
            for op in &task.operators {
                if !op.is_applicable(values) {
                    continue;
                }
                let cost = task.adjusted_cost(op.id, cost_type);
                let through = cost.saturating_add(distances[&op.apply(values)]);
                if through < distances[values] {
                    distances.insert(values.clone(), through);
                    changed = true;
                }
            }
        }
    }
    distances
}

/// Rates every state with the same estimate, goal states included.
#[derive(Debug)]
pub struct ConstantHeuristic(pub Cost);

impl Heuristic for ConstantHeuristic {
    fn evaluate(&mut self, _state: &State) -> HeuristicValue {
        HeuristicValue::Estimate(self.0)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }
}
