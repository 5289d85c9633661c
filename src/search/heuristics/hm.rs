use crate::search::{
    heuristics::{Heuristic, HeuristicValue},
    states::State,
    Cost, Fact, OperatorCost, OperatorId, PlannerError, Result, Task, INFINITE_COST,
};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info};

const TYPICAL_TUPLE_SIZE: usize = 4;

/// Facts on strictly increasing variables.
type Tuple = SmallVec<[Fact; TYPICAL_TUPLE_SIZE]>;

/// The h^m heuristic (Haslum and Geffner, AIPS 2000): the cost of a set of
/// facts is approximated by the cost of its most expensive subset of at most
/// `m` facts. The table holds every such subset and is recomputed from
/// scratch for each state, so this only suits small tasks. Effect conditions
/// are ignored.
#[derive(Debug)]
pub struct HmHeuristic {
    task: Rc<Task>,
    m: usize,
    costs: Vec<Cost>,
    goal: Tuple,
    preconditions: Vec<Tuple>,
    effects: Vec<Tuple>,
    tuples: Vec<Tuple>,
    tuple_index: HashMap<Tuple, usize>,
    table: Vec<Cost>,
}

impl HmHeuristic {
    pub fn new(task: Rc<Task>, m: usize, cost_type: OperatorCost) -> Result<Self> {
        if m == 0 {
            return Err(PlannerError::InvalidConfig(
                "h^m needs m of at least 1".to_string(),
            ));
        }
        let mut tuples = vec![];
        generate_all_tuples(&task, 0, m, &mut Tuple::new(), &mut tuples);
        let tuple_index = tuples
            .iter()
            .enumerate()
            .map(|(i, tuple)| (tuple.clone(), i))
            .collect();
        info!(m, num_tuples = tuples.len(), "h^m table generated");

        let preconditions = task
            .operators
            .iter()
            .map(|op| sorted_tuple(op.preconditions.iter().copied()))
            .collect();
        let effects = task
            .operators
            .iter()
            .map(|op| sorted_tuple(op.effects.iter().map(|effect| effect.fact)))
            .collect();
        let costs = (0..task.operators.len())
            .map(|op| task.adjusted_cost(OperatorId(op), cost_type))
            .collect();
        Ok(Self {
            m,
            costs,
            goal: sorted_tuple(task.goal.iter().copied()),
            preconditions,
            effects,
            table: vec![INFINITE_COST; tuples.len()],
            tuples,
            tuple_index,
            task,
        })
    }

    /// All non-empty subtuples of `tuple` with at most `m` facts.
    fn partial_tuples(&self, tuple: &[Fact]) -> Vec<Tuple> {
        let mut partial = vec![];
        collect_partial_tuples(tuple, 0, self.m, &mut Tuple::new(), &mut partial);
        partial
    }

    fn eval(&self, tuple: &[Fact]) -> Cost {
        self.partial_tuples(tuple)
            .iter()
            .map(|partial| self.table[self.tuple_index[partial]])
            .max()
            .unwrap_or(0)
    }

    fn update_entry(&mut self, index: usize, value: Cost) -> bool {
        if value < self.table[index] {
            self.table[index] = value;
            true
        } else {
            false
        }
    }

    fn init_table(&mut self, values: &[usize]) {
        for (tuple, entry) in self.tuples.iter().zip(self.table.iter_mut()) {
            *entry = if tuple.iter().all(|fact| fact.holds_in(values)) {
                0
            } else {
                INFINITE_COST
            };
        }
    }

    fn update_table(&mut self) {
        let mut round = 0;
        loop {
            round += 1;
            let mut updated = false;
            for op in 0..self.task.operators.len() {
                let pre_cost = self.eval(&self.preconditions[op]);
                if pre_cost == INFINITE_COST {
                    continue;
                }
                let cost = pre_cost.saturating_add(self.costs[op]);
                for partial in self.partial_tuples(&self.effects[op]) {
                    // Conditional effects may assign one variable twice.
                    let Some(&index) = self.tuple_index.get(&partial) else {
                        continue;
                    };
                    updated |= self.update_entry(index, cost);
                    if partial.len() < self.m {
                        updated |= self.extend_tuple(&partial, op);
                    }
                }
            }
            if !updated {
                break;
            }
        }
        debug!(round, "h^m fixed point reached");
    }

    /// Updates every larger tuple that contains `partial` and is consistent
    /// with the effects of `op`: it is reached by applying `op` where the
    /// other facts of the tuple already hold.
    fn extend_tuple(&mut self, partial: &[Fact], op: usize) -> bool {
        let mut updated = false;
        for index in 0..self.tuples.len() {
            let tuple = &self.tuples[index];
            if tuple.len() <= partial.len()
                || !partial.iter().all(|fact| tuple.contains(fact))
                || tuple.iter().any(|fact| {
                    self.effects[op]
                        .iter()
                        .any(|effect| effect.var == fact.var && effect.value != fact.value)
                })
            {
                continue;
            }
            let mut pre = self.preconditions[op].clone();
            for fact in tuple {
                if !partial.contains(fact) && !pre.contains(fact) {
                    pre.push(*fact);
                }
            }
            pre.sort_unstable();
            if pre.windows(2).any(|pair| pair[0].var == pair[1].var) {
                continue;
            }
            let pre_cost = self.eval(&pre);
            if pre_cost != INFINITE_COST {
                updated |= self.update_entry(index, pre_cost.saturating_add(self.costs[op]));
            }
        }
        updated
    }
}

fn sorted_tuple(facts: impl Iterator<Item = Fact>) -> Tuple {
    let mut tuple: Tuple = facts.collect();
    tuple.sort_unstable();
    tuple.dedup();
    tuple
}

fn generate_all_tuples(
    task: &Task,
    first_var: usize,
    size: usize,
    base: &mut Tuple,
    tuples: &mut Vec<Tuple>,
) {
    for var in first_var..task.num_variables() {
        for value in 0..task.domain_size(var) {
            base.push(Fact::new(var, value));
            tuples.push(base.clone());
            if size > 1 {
                generate_all_tuples(task, var + 1, size - 1, base, tuples);
            }
            base.pop();
        }
    }
}

fn collect_partial_tuples(
    tuple: &[Fact],
    first: usize,
    size: usize,
    base: &mut Tuple,
    partial: &mut Vec<Tuple>,
) {
    for (i, &fact) in tuple.iter().enumerate().skip(first) {
        base.push(fact);
        partial.push(base.clone());
        if size > 1 {
            collect_partial_tuples(tuple, i + 1, size - 1, base, partial);
        }
        base.pop();
    }
}

impl Heuristic for HmHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        if self.task.is_goal(state.values()) {
            return HeuristicValue::Estimate(0);
        }
        self.init_table(state.values());
        self.update_table();
        HeuristicValue::from_cost(self.eval(&self.goal))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        !self.task.has_conditional_effects()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::StateRegistry;
    use crate::test_utils::*;

    fn initial_value(text: &str, m: usize) -> HeuristicValue {
        let task = Rc::new(Task::from_text(text).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = HmHeuristic::new(task, m, OperatorCost::Normal).unwrap();
        heuristic.evaluate(&registry.initial_state())
    }

    #[test]
    fn truck_values() {
        assert_eq!(initial_value(TRUCK_SAS_TEXT, 1), HeuristicValue::Estimate(3));
        assert_eq!(initial_value(TRUCK_SAS_TEXT, 2), HeuristicValue::Estimate(5));
    }

    #[test]
    fn table_size() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let heuristic = HmHeuristic::new(task, 2, OperatorCost::Normal).unwrap();
        assert_eq!(heuristic.tuples.len(), 3 + 4 + 3 * 4);
    }

    #[test]
    fn admissible_on_blocks() {
        let task = Rc::new(Task::from_text(BLOCKS_SAS_TEXT).unwrap());
        let distances = goal_distances(&task, OperatorCost::Normal);
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = HmHeuristic::new(task.clone(), 2, OperatorCost::Normal).unwrap();
        for values in reachable_states(&task) {
            let state = registry.register_values(&values);
            match heuristic.evaluate(&state) {
                HeuristicValue::Estimate(h) => assert!(h <= distances[&values]),
                HeuristicValue::DeadEnd => assert_eq!(distances[&values], INFINITE_COST),
            }
        }
    }

    #[test]
    fn dead_ends() {
        let task = Rc::new(Task::from_text(DEAD_END_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = HmHeuristic::new(task, 2, OperatorCost::Normal).unwrap();
        assert!(heuristic.dead_ends_are_reliable());
        let trap = registry.register_values(&[1]);
        assert!(heuristic.evaluate(&trap).is_dead_end());
    }

    #[test]
    fn invalid_m() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        assert!(matches!(
            HmHeuristic::new(task, 0, OperatorCost::Normal),
            Err(PlannerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn conditional_effects_make_dead_ends_unreliable() {
        let task = Rc::new(Task::from_text(SWITCH_SAS_TEXT).unwrap());
        let heuristic = HmHeuristic::new(task, 1, OperatorCost::Normal).unwrap();
        assert!(!heuristic.dead_ends_are_reliable());
    }
}
