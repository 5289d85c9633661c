use crate::search::{
    heuristics::pdbs::{MatchTree, Pattern},
    Cost, Fact, Operator, OperatorCost, PlannerError, Result, Task, INFINITE_COST,
};
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use tracing::debug;

/// Abstract state spaces must be indexable by an `i32` perfect hash.
pub const MAX_PDB_SIZE: usize = i32::MAX as usize;

/// An operator of the abstract state space, used backwards: applying it to
/// the abstract state with index `i` leads to `i + hash_effect`.
#[derive(Debug, Clone)]
struct AbstractOperator {
    cost: Cost,
    /// Over pattern indices, sorted.
    regression_preconditions: Vec<Fact>,
    hash_effect: i64,
}

/// Goal distances of all states of the projection of a task onto a pattern.
#[derive(Debug, Clone)]
pub struct PatternDatabase {
    pattern: Pattern,
    hash_multipliers: Vec<usize>,
    distances: Vec<Cost>,
}

impl PatternDatabase {
    /// Builds the PDB with the adjusted task costs, or with
    /// `operator_costs[op]` for every operator if given.
    pub fn new(
        task: &Task,
        pattern: Pattern,
        cost_type: OperatorCost,
        operator_costs: Option<&[Cost]>,
    ) -> Result<Self> {
        if task.has_conditional_effects() {
            return Err(PlannerError::UnsupportedFeature(
                "conditional effects in pattern databases".to_string(),
            ));
        }
        debug_assert!(pattern.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(operator_costs.map_or(true, |costs| costs.len() == task.operators.len()));

        let mut hash_multipliers = Vec::with_capacity(pattern.len());
        let mut num_states: usize = 1;
        for &var in &pattern {
            hash_multipliers.push(num_states);
            num_states = num_states
                .checked_mul(task.domain_size(var))
                .filter(|&size| size <= MAX_PDB_SIZE)
                .ok_or_else(|| PlannerError::PatternTooLarge {
                    pattern: pattern.clone(),
                    size: num_states.saturating_mul(task.domain_size(var)),
                    max_size: MAX_PDB_SIZE,
                })?;
        }

        let mut variable_to_index = vec![None; task.num_variables()];
        for (index, &var) in pattern.iter().enumerate() {
            variable_to_index[var] = Some(index);
        }
        let domain_sizes: Vec<usize> = pattern.iter().map(|&var| task.domain_size(var)).collect();

        let mut operators = vec![];
        for op in &task.operators {
            let cost = match operator_costs {
                Some(costs) => costs[op.id.0],
                None => task.adjusted_cost(op.id, cost_type),
            };
            build_abstract_operators(
                op,
                cost,
                &variable_to_index,
                &hash_multipliers,
                &domain_sizes,
                &mut operators,
            );
        }

        let mut match_tree = MatchTree::new(hash_multipliers.clone(), domain_sizes.clone());
        for (index, op) in operators.iter().enumerate() {
            match_tree.insert(index, &op.regression_preconditions);
        }

        let abstract_goals: Vec<Fact> = task
            .goal
            .iter()
            .filter_map(|goal| variable_to_index[goal.var].map(|index| Fact::new(index, goal.value)))
            .collect();

        let mut pdb = Self {
            pattern,
            hash_multipliers,
            distances: vec![INFINITE_COST; num_states],
        };
        pdb.compute_distances(&operators, &match_tree, &abstract_goals, &domain_sizes);
        debug!(
            pattern = ?pdb.pattern,
            num_states,
            num_abstract_operators = operators.len(),
            "built pattern database"
        );
        Ok(pdb)
    }

    /// Backward Dijkstra from all abstract goal states.
    fn compute_distances(
        &mut self,
        operators: &[AbstractOperator],
        match_tree: &MatchTree,
        abstract_goals: &[Fact],
        domain_sizes: &[usize],
    ) {
        let mut queue: PriorityQueue<usize, Reverse<Cost>> = PriorityQueue::new();
        for state_index in 0..self.distances.len() {
            let is_goal = abstract_goals.iter().all(|goal| {
                (state_index / self.hash_multipliers[goal.var]) % domain_sizes[goal.var]
                    == goal.value
            });
            if is_goal {
                self.distances[state_index] = 0;
                queue.push(state_index, Reverse(0));
            }
        }

        let mut applicable = vec![];
        while let Some((state_index, Reverse(distance))) = queue.pop() {
            applicable.clear();
            match_tree.applicable_operators(state_index, &mut applicable);
            for &op_index in &applicable {
                let op = &operators[op_index];
                let predecessor = (state_index as i64 + op.hash_effect) as usize;
                let alternative = distance.saturating_add(op.cost);
                if alternative < self.distances[predecessor] {
                    self.distances[predecessor] = alternative;
                    queue.push_increase(predecessor, Reverse(alternative));
                }
            }
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Number of abstract states.
    pub fn size(&self) -> usize {
        self.distances.len()
    }

    fn hash_index(&self, values: &[usize]) -> usize {
        self.pattern
            .iter()
            .zip(&self.hash_multipliers)
            .map(|(&var, &multiplier)| values[var] * multiplier)
            .sum()
    }

    /// The abstract goal distance of the projection of `values`,
    /// [`INFINITE_COST`] if no abstract goal is reachable.
    pub fn value(&self, values: &[usize]) -> Cost {
        self.distances[self.hash_index(values)]
    }

    /// Mean over all abstract states with a finite goal distance.
    pub fn mean_finite_h(&self) -> f64 {
        let (sum, count) = self
            .distances
            .iter()
            .filter(|&&h| h != INFINITE_COST)
            .fold((0.0, 0usize), |(sum, count), &h| (sum + f64::from(h), count + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Whether the operator changes some variable of the pattern.
    pub fn is_operator_relevant(&self, op: &Operator) -> bool {
        op.effects
            .iter()
            .any(|effect| self.pattern.binary_search(&effect.fact.var).is_ok())
    }
}

/// Adds the abstract operators induced by `op`. An effect on a pattern
/// variable without a precondition is multiplied out over all values the
/// variable could have had.
fn build_abstract_operators(
    op: &Operator,
    cost: Cost,
    variable_to_index: &[Option<usize>],
    hash_multipliers: &[usize],
    domain_sizes: &[usize],
    operators: &mut Vec<AbstractOperator>,
) {
    let mut prevail = vec![];
    let mut transitions = vec![];
    let mut unknown_origin = vec![];
    for effect in &op.effects {
        if let Some(index) = variable_to_index[effect.fact.var] {
            match op.precondition_on(effect.fact.var) {
                Some(pre) => transitions.push((index, pre, effect.fact.value)),
                None => unknown_origin.push((index, effect.fact.value)),
            }
        }
    }
    if transitions.is_empty() && unknown_origin.is_empty() {
        return;
    }
    for pre in &op.preconditions {
        if let Some(index) = variable_to_index[pre.var] {
            if !transitions.iter().any(|&(var, _, _)| var == index) {
                prevail.push(Fact::new(index, pre.value));
            }
        }
    }
    multiply_out(
        &unknown_origin,
        &mut transitions,
        &prevail,
        cost,
        hash_multipliers,
        domain_sizes,
        operators,
    );
}

fn multiply_out(
    unknown_origin: &[(usize, usize)],
    transitions: &mut Vec<(usize, usize, usize)>,
    prevail: &[Fact],
    cost: Cost,
    hash_multipliers: &[usize],
    domain_sizes: &[usize],
    operators: &mut Vec<AbstractOperator>,
) {
    let Some((&(index, post), rest)) = unknown_origin.split_first() else {
        let hash_effect: i64 = transitions
            .iter()
            .map(|&(index, pre, post)| (pre as i64 - post as i64) * hash_multipliers[index] as i64)
            .sum();
        if hash_effect == 0 {
            // A self loop cannot shorten any distance.
            return;
        }
        let mut regression_preconditions: Vec<Fact> = prevail
            .iter()
            .copied()
            .chain(transitions.iter().map(|&(index, _, post)| Fact::new(index, post)))
            .collect();
        regression_preconditions.sort_unstable();
        operators.push(AbstractOperator {
            cost,
            regression_preconditions,
            hash_effect,
        });
        return;
    };
    for pre in 0..domain_sizes[index] {
        transitions.push((index, pre, post));
        multiply_out(
            rest,
            transitions,
            prevail,
            cost,
            hash_multipliers,
            domain_sizes,
            operators,
        );
        transitions.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    fn pdb(text: &str, pattern: Pattern) -> (Task, PatternDatabase) {
        let task = Task::from_text(text).unwrap();
        let pdb = PatternDatabase::new(&task, pattern, OperatorCost::Normal, None).unwrap();
        (task, pdb)
    }

    #[test]
    fn grid_projections() {
        let (_, pdb_x) = pdb(GRID_SAS_TEXT, vec![0]);
        assert_eq!(pdb_x.value(&[0, 0]), 3);
        assert_eq!(pdb_x.value(&[1, 1]), 2);
        assert_eq!(pdb_x.value(&[2, 0]), 0);
        let (_, pdb_y) = pdb(GRID_SAS_TEXT, vec![1]);
        assert_eq!(pdb_y.value(&[0, 0]), 1);
        assert_eq!(pdb_y.value(&[0, 1]), 0);
        assert_eq!(pdb_y.size(), 2);
    }

    #[test]
    fn projections_are_admissible() {
        for (text, patterns) in [
            (GRID_SAS_TEXT, vec![vec![0], vec![1], vec![0, 1]]),
            (TRUCK_SAS_TEXT, vec![vec![0], vec![1], vec![0, 1]]),
            (BLOCKS_SAS_TEXT, vec![vec![0], vec![1], vec![2], vec![1, 2], vec![0, 1, 2]]),
        ] {
            let task = Task::from_text(text).unwrap();
            let distances = goal_distances(&task, OperatorCost::Normal);
            for pattern in patterns {
                let pdb =
                    PatternDatabase::new(&task, pattern.clone(), OperatorCost::Normal, None)
                        .unwrap();
                for (values, &distance) in &distances {
                    assert!(
                        pdb.value(values) <= distance,
                        "pattern {:?} overestimates {:?}",
                        pattern,
                        values
                    );
                }
            }
        }
    }

    #[test]
    fn full_pattern_is_exact() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let pdb = PatternDatabase::new(&task, vec![0, 1], OperatorCost::Normal, None).unwrap();
        for (values, distance) in goal_distances(&task, OperatorCost::Normal) {
            assert_eq!(pdb.value(&values), distance, "state {:?}", values);
        }
        assert_eq!(pdb.value(&task.initial_state), 5);
    }

    #[test]
    fn unreachable_goal_is_infinite() {
        let (task, pdb) = pdb(UNSOLVABLE_SAS_TEXT, vec![0]);
        assert_eq!(pdb.value(&task.initial_state), INFINITE_COST);
        assert_eq!(pdb.value(&[2]), 0);
        assert_eq!(pdb.mean_finite_h(), 0.0);
    }

    #[test]
    fn custom_operator_costs() {
        let task = Task::from_text(GRID_SAS_TEXT).unwrap();
        let pdb = PatternDatabase::new(&task, vec![0], OperatorCost::Normal, Some(&[0, 5, 1]))
            .unwrap();
        assert_eq!(pdb.value(&[0, 0]), 5);
        assert_eq!(pdb.value(&[1, 0]), 5);
        assert!(pdb.is_operator_relevant(&task.operators[0]));
        assert!(!pdb.is_operator_relevant(&task.operators[2]));
    }

    #[test]
    fn mean_of_finite_values() {
        let (_, pdb) = pdb(GRID_SAS_TEXT, vec![0]);
        assert_approx_eq::assert_approx_eq!(pdb.mean_finite_h(), 5.0 / 3.0);
    }

    #[test]
    fn conditional_effects_are_rejected() {
        let task = Task::from_text(SWITCH_SAS_TEXT).unwrap();
        assert!(matches!(
            PatternDatabase::new(&task, vec![0], OperatorCost::Normal, None),
            Err(PlannerError::UnsupportedFeature(_))
        ));
    }
}
