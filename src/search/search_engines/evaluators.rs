use crate::search::{
    heuristics::{Heuristic, HeuristicValue, PreferredOperators},
    states::State,
    OperatorId, PlannerError, Result, Task,
};
use strum_macros::EnumIs;
use tracing::trace;

/// How the heuristics of a search judge a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum DeadEndStatus {
    Alive,
    /// A heuristic with reliable dead ends reports a dead end.
    Reliable,
    /// Every heuristic reports a dead end, but none of them reliably.
    Unreliable,
}

impl DeadEndStatus {
    pub fn is_dead_end(&self) -> bool {
        !self.is_alive()
    }
}

/// The heuristics of one search, evaluated together on every state.
#[derive(Debug)]
pub struct Evaluators {
    heuristics: Vec<Box<dyn Heuristic>>,
    /// Indices of the heuristics whose preferred operators are used.
    preferred_operator_heuristics: Vec<usize>,
    h_values: Vec<HeuristicValue>,
    preferred: PreferredOperators,
}

impl Evaluators {
    pub fn new(
        task: &Task,
        heuristics: Vec<Box<dyn Heuristic>>,
        preferred_operator_heuristics: Vec<usize>,
    ) -> Result<Self> {
        if heuristics.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "a search needs at least one heuristic".to_string(),
            ));
        }
        if let Some(&index) = preferred_operator_heuristics
            .iter()
            .find(|&&index| index >= heuristics.len())
        {
            return Err(PlannerError::InvalidConfig(format!(
                "preferred operator heuristic {} does not exist, there are {} heuristics",
                index,
                heuristics.len()
            )));
        }
        Ok(Self {
            h_values: vec![HeuristicValue::DeadEnd; heuristics.len()],
            heuristics,
            preferred_operator_heuristics,
            preferred: PreferredOperators::new(task.operators.len()),
        })
    }

    pub fn len(&self) -> usize {
        self.heuristics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heuristics.is_empty()
    }

    pub fn uses_preferred_operators(&self) -> bool {
        !self.preferred_operator_heuristics.is_empty()
    }

    pub fn notify_initial_state(&mut self, state: &State) {
        for heuristic in &mut self.heuristics {
            heuristic.notify_initial_state(state);
        }
    }

    pub fn notify_state_transition(&mut self, parent: &State, op: OperatorId, state: &State) {
        for heuristic in &mut self.heuristics {
            heuristic.notify_state_transition(parent, op, state);
        }
    }

    /// Evaluates every heuristic on `state`. A state is a dead end if one
    /// heuristic with reliable dead ends says so, or if all heuristics do.
    pub fn evaluate(&mut self, state: &State) -> DeadEndStatus {
        let mut reliable_dead_end = false;
        for (heuristic, value) in self.heuristics.iter_mut().zip(&mut self.h_values) {
            *value = heuristic.evaluate(state);
            if value.is_dead_end() && heuristic.dead_ends_are_reliable() {
                reliable_dead_end = true;
            }
        }
        trace!(state = %state.id(), h_values = ?self.h_values);
        if reliable_dead_end {
            DeadEndStatus::Reliable
        } else if self.h_values.iter().all(HeuristicValue::is_dead_end) {
            DeadEndStatus::Unreliable
        } else {
            DeadEndStatus::Alive
        }
    }

    /// The values of the last evaluation.
    pub fn h_values(&self) -> &[HeuristicValue] {
        &self.h_values
    }

    /// Whether some heuristic rated the last evaluated state 0. Admissible
    /// heuristics rate every goal state 0, inadmissible ones need not.
    pub fn any_is_zero(&self) -> bool {
        self.h_values
            .iter()
            .any(|h| *h == HeuristicValue::Estimate(0))
    }

    /// Collects the preferred operators of the last evaluation.
    pub fn preferred_operators(&mut self) -> &PreferredOperators {
        self.preferred.clear();
        for &index in &self.preferred_operator_heuristics {
            for &op in self.heuristics[index].preferred_operators() {
                self.preferred.mark(op);
            }
        }
        &self.preferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::{BlindHeuristic, CgHeuristic, HmHeuristic},
        states::StateRegistry,
        OperatorCost,
    };
    use crate::test_utils::*;
    use std::rc::Rc;

    #[test]
    fn reliable_dead_end_wins() {
        let task = Rc::new(Task::from_text(DEAD_END_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal)),
            Box::new(HmHeuristic::new(task.clone(), 1, OperatorCost::Normal).unwrap()),
        ];
        let mut evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        let trap = registry.register_values(&[1]);
        assert_eq!(evaluators.evaluate(&trap), DeadEndStatus::Reliable);
        assert_eq!(evaluators.h_values()[0], HeuristicValue::Estimate(1));
        let initial = registry.initial_state();
        assert_eq!(evaluators.evaluate(&initial), DeadEndStatus::Alive);
    }

    #[test]
    fn unreliable_dead_ends_need_consensus() {
        let task = Rc::new(Task::from_text(DEAD_END_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let trap = registry.register_values(&[1]);

        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(CgHeuristic::new(task.clone(), OperatorCost::Normal, 0)),
            Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal)),
        ];
        let mut evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        assert_eq!(evaluators.evaluate(&trap), DeadEndStatus::Alive);

        let heuristics: Vec<Box<dyn Heuristic>> = vec![Box::new(CgHeuristic::new(
            task.clone(),
            OperatorCost::Normal,
            0,
        ))];
        let mut evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        assert_eq!(evaluators.evaluate(&trap), DeadEndStatus::Unreliable);
    }

    #[test]
    fn preferred_operators_of_selected_heuristics() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal)),
            Box::new(CgHeuristic::new(task.clone(), OperatorCost::Normal, 0)),
        ];
        let mut evaluators = Evaluators::new(&task, heuristics, vec![1]).unwrap();
        assert!(evaluators.uses_preferred_operators());
        evaluators.evaluate(&registry.initial_state());
        assert!(!evaluators.any_is_zero());
        assert_eq!(evaluators.preferred_operators().as_slice(), &[OperatorId(0)]);
    }

    #[test]
    fn zero_from_a_later_heuristic_counts() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let goal = reachable_states(&task)
            .into_iter()
            .find(|values| task.is_goal(values))
            .unwrap();
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(ConstantHeuristic(5)),
            Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal)),
        ];
        let mut evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        evaluators.evaluate(&registry.register_values(&goal));
        assert_eq!(evaluators.h_values()[0], HeuristicValue::Estimate(5));
        assert!(evaluators.any_is_zero());

        evaluators.evaluate(&registry.initial_state());
        assert!(!evaluators.any_is_zero());
    }

    #[test]
    fn invalid_configurations() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        assert!(matches!(
            Evaluators::new(&task, vec![], vec![]),
            Err(PlannerError::InvalidConfig(_))
        ));
        let heuristics: Vec<Box<dyn Heuristic>> =
            vec![Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal))];
        assert!(matches!(
            Evaluators::new(&task, heuristics, vec![1]),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
