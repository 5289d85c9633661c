use crate::search::{
    heuristics::{
        landmarks::{
            generate_zhu_givan_landmarks, LandmarkGraph, LandmarkStatus, LandmarkStatusManager,
        },
        Heuristic, HeuristicValue, PreferredOperators,
    },
    states::State,
    successor_generators::SuccessorGenerator,
    Cost, OperatorCost, OperatorId, Task, INFINITE_COST,
};
use std::rc::Rc;
use tracing::info;

/// The landmark count heuristic (Richter, Helmert and Westphal, AAAI 2008)
/// with the cost of a landmark taken as its cheapest achiever. Landmarks are
/// generated once, and which of them were reached is tracked along the paths
/// the search reports through the notification methods.
#[derive(Debug)]
pub struct LandmarkCountHeuristic {
    task: Rc<Task>,
    graph: LandmarkGraph,
    status_manager: LandmarkStatusManager,
    /// Per landmark, the cheapest first and possible achiever.
    min_first_achiever_costs: Vec<Cost>,
    min_possible_achiever_costs: Vec<Cost>,
    successor_generator: SuccessorGenerator,
    applicable: Vec<OperatorId>,
    preferred: PreferredOperators,
}

impl LandmarkCountHeuristic {
    pub fn new(task: Rc<Task>, cost_type: OperatorCost) -> Self {
        let graph = generate_zhu_givan_landmarks(&task);
        let min_cost = |achievers: &[OperatorId]| {
            achievers
                .iter()
                .map(|&op| task.adjusted_cost(op, cost_type))
                .min()
                .unwrap_or(INFINITE_COST)
        };
        let min_first_achiever_costs = graph
            .landmarks()
            .iter()
            .map(|landmark| min_cost(&landmark.first_achievers))
            .collect();
        let min_possible_achiever_costs = graph
            .landmarks()
            .iter()
            .map(|landmark| min_cost(&landmark.possible_achievers))
            .collect();
        info!(
            num_landmarks = graph.num_landmarks(),
            "landmark count heuristic initialized"
        );
        Self {
            status_manager: LandmarkStatusManager::new(&graph),
            min_first_achiever_costs,
            min_possible_achiever_costs,
            successor_generator: SuccessorGenerator::new(&task),
            applicable: vec![],
            preferred: PreferredOperators::new(task.operators.len()),
            graph,
            task,
        }
    }

    fn heuristic_value(&self) -> Cost {
        (0..self.graph.num_landmarks())
            .map(|id| match self.status_manager.status(id) {
                LandmarkStatus::Reached => 0,
                LandmarkStatus::NotReached => self.min_first_achiever_costs[id],
                LandmarkStatus::NeededAgain => self.min_possible_achiever_costs[id],
            })
            .fold(0, Cost::saturating_add)
    }

    /// Landmarks worth achieving next: while some landmark is not reached,
    /// those whose parents are all reached; afterwards the goals that are
    /// false.
    fn interesting_landmarks(&self, values: &[usize]) -> Vec<bool> {
        let statuses: Vec<LandmarkStatus> = (0..self.graph.num_landmarks())
            .map(|id| self.status_manager.status(id))
            .collect();
        let all_reached = !statuses.iter().any(LandmarkStatus::is_not_reached);
        self.graph
            .landmarks()
            .iter()
            .enumerate()
            .map(|(id, landmark)| {
                if all_reached {
                    landmark.is_true_in_goal && !landmark.is_true_in_state(values)
                } else {
                    statuses[id].is_not_reached()
                        && self
                            .graph
                            .parents(id)
                            .iter()
                            .all(|&parent| !statuses[parent].is_not_reached())
                }
            })
            .collect()
    }

    fn compute_preferred_operators(&mut self, values: &[usize]) {
        let interesting = self.interesting_landmarks(values);
        self.applicable.clear();
        self.successor_generator
            .generate_applicable_ops(values, &mut self.applicable);
        for &op in &self.applicable {
            let achieves_interesting = self
                .task
                .operator(op)
                .effects
                .iter()
                .filter(|effect| effect.does_fire(values))
                .any(|effect| {
                    self.graph
                        .landmark_id(effect.fact)
                        .is_some_and(|id| interesting[id])
                });
            if achieves_interesting {
                self.preferred.mark(op);
            }
        }
    }
}

impl Heuristic for LandmarkCountHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        self.preferred.clear();
        let values = state.values();
        if self.task.is_goal(values) {
            return HeuristicValue::Estimate(0);
        }
        self.status_manager.update_statuses(&self.graph, state);
        if self.status_manager.dead_end_exists(&self.graph) {
            return HeuristicValue::DeadEnd;
        }
        let h = self.heuristic_value();
        if h == INFINITE_COST {
            return HeuristicValue::DeadEnd;
        }
        self.compute_preferred_operators(values);
        HeuristicValue::Estimate(h)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        self.preferred.as_slice()
    }

    fn notify_initial_state(&mut self, state: &State) {
        self.status_manager
            .process_initial_state(&self.graph, state);
    }

    fn notify_state_transition(&mut self, parent: &State, _op: OperatorId, state: &State) {
        self.status_manager
            .process_state_transition(&self.graph, parent, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::StateRegistry;
    use crate::test_utils::*;

    #[test]
    fn truck_values_along_a_path() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = LandmarkCountHeuristic::new(task, OperatorCost::Normal);
        let initial = registry.initial_state();
        heuristic.notify_initial_state(&initial);
        assert_eq!(heuristic.evaluate(&initial), HeuristicValue::Estimate(4));
        assert_eq!(
            heuristic.preferred_operators(),
            &[OperatorId(0), OperatorId(4)]
        );

        let at_b = registry.successor_state(&initial, OperatorId(0));
        heuristic.notify_state_transition(&initial, OperatorId(0), &at_b);
        assert_eq!(heuristic.evaluate(&at_b), HeuristicValue::Estimate(3));
    }

    #[test]
    fn needed_again_goal_is_counted() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = LandmarkCountHeuristic::new(task, OperatorCost::Normal);
        let initial = registry.initial_state();
        heuristic.notify_initial_state(&initial);
        let at_b = registry.successor_state(&initial, OperatorId(0));
        heuristic.notify_state_transition(&initial, OperatorId(0), &at_b);
        let at_c = registry.successor_state(&at_b, OperatorId(2));
        heuristic.notify_state_transition(&at_b, OperatorId(2), &at_c);
        // Package landmarks remain, and the truck must return to b.
        assert_eq!(heuristic.evaluate(&at_c), HeuristicValue::Estimate(3));
    }

    #[test]
    fn unsolvable_initial_state() {
        let task = Rc::new(Task::from_text(UNSOLVABLE_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = LandmarkCountHeuristic::new(task, OperatorCost::Normal);
        let initial = registry.initial_state();
        heuristic.notify_initial_state(&initial);
        assert!(heuristic.evaluate(&initial).is_dead_end());
        assert!(heuristic.dead_ends_are_reliable());
    }
}
