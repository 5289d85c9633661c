use crate::search::{
    heuristics::{Heuristic, HeuristicValue},
    states::State,
    Cost, OperatorCost, Task,
};
use std::rc::Rc;

/// 0 on goal states and the cheapest operator cost everywhere else.
#[derive(Debug)]
pub struct BlindHeuristic {
    task: Rc<Task>,
    min_operator_cost: Cost,
}

impl BlindHeuristic {
    pub fn new(task: Rc<Task>, cost_type: OperatorCost) -> Self {
        let min_operator_cost = task.min_operator_cost(cost_type);
        Self {
            task,
            min_operator_cost,
        }
    }
}

impl Heuristic for BlindHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.is_goal(state.values()) {
            HeuristicValue::Estimate(0)
        } else {
            HeuristicValue::Estimate(self.min_operator_cost)
        }
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
