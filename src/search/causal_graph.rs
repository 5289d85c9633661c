use crate::search::Task;
use std::collections::BTreeSet;

/// The causal graph of a task. There is a pre->eff arc `u -> v` if some
/// operator has a precondition (or effect condition) on `u` and an effect on
/// `v`, and an eff-eff edge between `u` and `v` if one operator affects both.
/// Self loops are never stored. All adjacency lists are sorted.
#[derive(Debug, Clone)]
pub struct CausalGraph {
    pre_to_eff: Vec<Vec<usize>>,
    eff_to_pre: Vec<Vec<usize>>,
    eff_to_eff: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl CausalGraph {
    pub fn new(task: &Task) -> Self {
        let num_vars = task.num_variables();
        let mut pre_to_eff = vec![BTreeSet::new(); num_vars];
        let mut eff_to_pre = vec![BTreeSet::new(); num_vars];
        let mut eff_to_eff = vec![BTreeSet::new(); num_vars];
        let mut successors = vec![BTreeSet::new(); num_vars];
        let mut predecessors = vec![BTreeSet::new(); num_vars];

        let mut add_pre_eff = |u: usize, v: usize| {
            if u != v {
                pre_to_eff[u].insert(v);
                successors[u].insert(v);
                eff_to_pre[v].insert(u);
                predecessors[v].insert(u);
            }
        };
        for op in &task.operators {
            for pre in &op.preconditions {
                for eff in &op.effects {
                    add_pre_eff(pre.var, eff.fact.var);
                }
            }
            for eff in &op.effects {
                for cond in &eff.conditions {
                    add_pre_eff(cond.var, eff.fact.var);
                }
            }
        }
        for op in &task.operators {
            for eff1 in &op.effects {
                for eff2 in &op.effects {
                    let (u, v) = (eff1.fact.var, eff2.fact.var);
                    if u != v {
                        eff_to_eff[u].insert(v);
                        successors[u].insert(v);
                        predecessors[u].insert(v);
                    }
                }
            }
        }

        let to_vecs = |sets: Vec<BTreeSet<usize>>| -> Vec<Vec<usize>> {
            sets.into_iter().map(|set| set.into_iter().collect()).collect()
        };
        Self {
            pre_to_eff: to_vecs(pre_to_eff),
            eff_to_pre: to_vecs(eff_to_pre),
            eff_to_eff: to_vecs(eff_to_eff),
            successors: to_vecs(successors),
            predecessors: to_vecs(predecessors),
        }
    }

    pub fn pre_to_eff(&self, var: usize) -> &[usize] {
        &self.pre_to_eff[var]
    }

    pub fn eff_to_pre(&self, var: usize) -> &[usize] {
        &self.eff_to_pre[var]
    }

    pub fn eff_to_eff(&self, var: usize) -> &[usize] {
        &self.eff_to_eff[var]
    }

    pub fn successors(&self, var: usize) -> &[usize] {
        &self.successors[var]
    }

    pub fn predecessors(&self, var: usize) -> &[usize] {
        &self.predecessors[var]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn truck_depends_on_nothing() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let cg = CausalGraph::new(&task);
        assert_eq!(cg.pre_to_eff(0), &[1]);
        assert_eq!(cg.eff_to_pre(1), &[0]);
        assert!(cg.predecessors(0).is_empty());
        assert!(cg.eff_to_eff(1).is_empty());
    }

    #[test]
    fn blocks_has_eff_eff_edges() {
        let task = Task::from_text(BLOCKS_SAS_TEXT).unwrap();
        let cg = CausalGraph::new(&task);
        assert_eq!(cg.eff_to_eff(0), &[1, 2]);
        assert_eq!(cg.successors(2), &[0, 1]);
        assert_eq!(cg.predecessors(2), &[0, 1]);
    }

    #[test]
    fn effect_conditions_create_arcs() {
        let task = Task::from_text(SWITCH_SAS_TEXT).unwrap();
        let cg = CausalGraph::new(&task);
        assert_eq!(cg.pre_to_eff(2), &[0]);
        assert_eq!(cg.pre_to_eff(1), &[0]);
    }
}
