use crate::search::{
    heuristics::{
        pdbs::{validate_and_normalize_patterns, PatternDatabase},
        Heuristic, HeuristicValue,
    },
    states::State,
    Cost, OperatorCost, Result, Task, INFINITE_COST,
};
use std::rc::Rc;
use tracing::info;

/// Sums PDBs under a zero-one cost partitioning: the PDBs are built in
/// order, and an operator relevant to one PDB costs 0 in all later ones, so
/// every operator's cost is counted at most once.
#[derive(Debug)]
pub struct ZeroOnePdbs {
    pdbs: Vec<PatternDatabase>,
}

impl ZeroOnePdbs {
    pub fn new(task: Rc<Task>, patterns: &[Vec<usize>], cost_type: OperatorCost) -> Result<Self> {
        let patterns = validate_and_normalize_patterns(&task, patterns)?;
        let mut operator_costs: Vec<Cost> = task
            .operators
            .iter()
            .map(|op| task.adjusted_cost(op.id, cost_type))
            .collect();
        let mut pdbs = Vec::with_capacity(patterns.len());
        let mut fitness = 0.0;
        for pattern in patterns {
            let pdb = PatternDatabase::new(&task, pattern, cost_type, Some(&operator_costs))?;
            for op in &task.operators {
                if pdb.is_operator_relevant(op) {
                    operator_costs[op.id.0] = 0;
                }
            }
            fitness += pdb.mean_finite_h();
            pdbs.push(pdb);
        }
        info!(num_pdbs = pdbs.len(), fitness, "zero-one pdbs");
        Ok(Self { pdbs })
    }

    pub fn pdbs(&self) -> &[PatternDatabase] {
        &self.pdbs
    }
}

impl Heuristic for ZeroOnePdbs {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        let mut h: Cost = 0;
        for pdb in &self.pdbs {
            let value = pdb.value(state.values());
            if value == INFINITE_COST {
                return HeuristicValue::DeadEnd;
            }
            h = h.saturating_add(value);
        }
        HeuristicValue::Estimate(h)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
