use crate::search::{
    heuristics::{
        pdbs::{validate_and_normalize_pattern, Pattern, PatternDatabase},
        Heuristic, HeuristicValue,
    },
    states::State,
    OperatorCost, Result, Task,
};
use std::rc::Rc;
use tracing::info;

/// Looks up states in a single pattern database.
#[derive(Debug)]
pub struct PdbHeuristic {
    pdb: PatternDatabase,
}

impl PdbHeuristic {
    /// An empty pattern stands for all goal variables.
    pub fn new(task: Rc<Task>, pattern: &[usize], cost_type: OperatorCost) -> Result<Self> {
        let pattern: Pattern = if pattern.is_empty() {
            task.goal.iter().map(|goal| goal.var).collect()
        } else {
            pattern.to_vec()
        };
        let pattern = validate_and_normalize_pattern(&task, &pattern)?;
        let pdb = PatternDatabase::new(&task, pattern, cost_type, None)?;
        info!(pattern = ?pdb.pattern(), size = pdb.size(), "pdb heuristic");
        Ok(Self { pdb })
    }

    pub fn pdb(&self) -> &PatternDatabase {
        &self.pdb
    }
}

impl Heuristic for PdbHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        HeuristicValue::from_cost(self.pdb.value(state.values()))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
