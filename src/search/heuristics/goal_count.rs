use crate::search::{
    heuristics::{Heuristic, HeuristicValue},
    states::State,
    Cost, Task,
};
use std::rc::Rc;

/// Counts the goal facts that do not hold.
#[derive(Debug)]
pub struct GoalCountHeuristic {
    task: Rc<Task>,
}

impl GoalCountHeuristic {
    pub fn new(task: Rc<Task>) -> Self {
        Self { task }
    }
}

impl Heuristic for GoalCountHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        let unsatisfied = self
            .task
            .goal
            .iter()
            .filter(|goal| !goal.holds_in(state.values()))
            .count();
        HeuristicValue::Estimate(unsatisfied as Cost)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
