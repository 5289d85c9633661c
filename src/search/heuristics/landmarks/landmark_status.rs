use crate::search::{
    algorithms::DynamicBitset,
    heuristics::landmarks::LandmarkGraph,
    states::{PerStateInformation, State},
};
use strum_macros::EnumIs;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum LandmarkStatus {
    Reached,
    NotReached,
    /// Reached before, false now, and required again by the goal.
    NeededAgain,
}

/// Tracks for every state which landmarks have been reached on the path the
/// search found to it. Reached sets of several paths to one state are
/// intersected, so the tracked set is the set of landmarks reached on all
/// of them.
#[derive(Debug)]
pub struct LandmarkStatusManager {
    reached: PerStateInformation<DynamicBitset>,
    statuses: Vec<LandmarkStatus>,
    /// Some landmark that is not yet reached has no first achiever.
    task_is_unsolvable: bool,
}

impl LandmarkStatusManager {
    pub fn new(graph: &LandmarkGraph) -> Self {
        let num_landmarks = graph.num_landmarks();
        Self {
            reached: PerStateInformation::new(DynamicBitset::full(num_landmarks)),
            statuses: vec![LandmarkStatus::NotReached; num_landmarks],
            task_is_unsolvable: false,
        }
    }

    pub fn process_initial_state(&mut self, graph: &LandmarkGraph, initial_state: &State) {
        let values = initial_state.values();
        let reached = self.reached.get_mut(initial_state);
        reached.reset_all();
        for (id, landmark) in graph.landmarks().iter().enumerate() {
            if graph.parents(id).is_empty() && landmark.is_true_in_state(values) {
                reached.set(id);
            }
        }
        self.task_is_unsolvable = graph
            .landmarks()
            .iter()
            .enumerate()
            .any(|(id, landmark)| !reached.test(id) && landmark.first_achievers.is_empty());
        debug!(
            num_reached = reached.count(),
            unsolvable = self.task_is_unsolvable,
            "landmarks of the initial state"
        );
    }

    /// Updates the reached set of `state` with the landmarks reached on the
    /// path through `parent`.
    pub fn process_state_transition(
        &mut self,
        graph: &LandmarkGraph,
        parent: &State,
        state: &State,
    ) {
        if parent.id() == state.id() {
            return;
        }
        let parent_reached = self.reached.get(parent).clone();
        let values = state.values();
        let reached = self.reached.get_mut(state);
        reached.intersect_with(&parent_reached);
        for (id, landmark) in graph.landmarks().iter().enumerate() {
            if !parent_reached.test(id)
                && landmark.is_true_in_state(values)
                && graph.parents(id).iter().all(|&parent| parent_reached.test(parent))
            {
                reached.set(id);
            }
        }
    }

    /// Computes the statuses of all landmarks in `state` from its reached
    /// set.
    pub fn update_statuses(&mut self, graph: &LandmarkGraph, state: &State) {
        let values = state.values();
        let reached = self.reached.get(state);
        for (id, landmark) in graph.landmarks().iter().enumerate() {
            self.statuses[id] = if !reached.test(id) {
                LandmarkStatus::NotReached
            } else if landmark.is_true_in_goal && !landmark.is_true_in_state(values) {
                LandmarkStatus::NeededAgain
            } else {
                LandmarkStatus::Reached
            };
        }
    }

    pub fn status(&self, id: usize) -> LandmarkStatus {
        self.statuses[id]
    }

    pub fn reached(&self, state: &State) -> &DynamicBitset {
        self.reached.get(state)
    }

    /// Whether the statuses of the last update prove that the goal cannot
    /// be reached.
    pub fn dead_end_exists(&self, graph: &LandmarkGraph) -> bool {
        self.task_is_unsolvable
            || graph.landmarks().iter().enumerate().any(|(id, landmark)| {
                self.statuses[id].is_needed_again()
                    && landmark.possible_achievers.is_empty()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::landmarks::generate_zhu_givan_landmarks, states::StateRegistry, Fact,
        OperatorId, Task,
    };
    use crate::test_utils::*;
    use std::rc::Rc;

    #[test]
    fn reached_landmarks_along_a_path() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let graph = generate_zhu_givan_landmarks(&task);
        let mut registry = StateRegistry::new(task).unwrap();
        let mut manager = LandmarkStatusManager::new(&graph);
        let truck_a = graph.landmark_id(Fact::new(0, 0)).unwrap();
        let truck_b = graph.landmark_id(Fact::new(0, 1)).unwrap();
        let package_a = graph.landmark_id(Fact::new(1, 0)).unwrap();

        let initial = registry.initial_state();
        manager.process_initial_state(&graph, &initial);
        assert_eq!(
            manager.reached(&initial).iter_ones().collect::<Vec<_>>(),
            vec![truck_a, package_a]
        );

        let at_b = registry.successor_state(&initial, OperatorId(0));
        manager.process_state_transition(&graph, &initial, &at_b);
        assert!(manager.reached(&at_b).test(truck_b));

        // Driving on to c leaves the truck goal needed again.
        let at_c = registry.successor_state(&at_b, OperatorId(2));
        manager.process_state_transition(&graph, &at_b, &at_c);
        manager.update_statuses(&graph, &at_c);
        assert_eq!(manager.status(truck_b), LandmarkStatus::NeededAgain);
        assert_eq!(manager.status(truck_a), LandmarkStatus::Reached);
        assert!(!manager.dead_end_exists(&graph));
    }

    #[test]
    fn reached_sets_of_two_paths_are_intersected() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let graph = generate_zhu_givan_landmarks(&task);
        let mut registry = StateRegistry::new(task).unwrap();
        let mut manager = LandmarkStatusManager::new(&graph);
        let package_in = graph.landmark_id(Fact::new(1, 3)).unwrap();

        let initial = registry.initial_state();
        manager.process_initial_state(&graph, &initial);
        let loaded = registry.successor_state(&initial, OperatorId(4));
        manager.process_state_transition(&graph, &initial, &loaded);
        assert!(manager.reached(&loaded).test(package_in));

        // Reaching the initial state again keeps only the landmarks
        // reached on both paths.
        let unloaded = registry.successor_state(&loaded, OperatorId(7));
        assert_eq!(unloaded.id(), initial.id());
        manager.process_state_transition(&graph, &loaded, &unloaded);
        assert!(!manager.reached(&initial).test(package_in));
    }

    #[test]
    fn landmark_without_first_achievers() {
        let task = Rc::new(Task::from_text(UNSOLVABLE_SAS_TEXT).unwrap());
        let graph = generate_zhu_givan_landmarks(&task);
        let mut registry = StateRegistry::new(task).unwrap();
        let mut manager = LandmarkStatusManager::new(&graph);
        let initial = registry.initial_state();
        manager.process_initial_state(&graph, &initial);
        manager.update_statuses(&graph, &initial);
        assert!(manager.dead_end_exists(&graph));
    }
}
