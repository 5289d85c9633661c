//! Domain transition graphs as used by the causal graph and context-enhanced
//! additive heuristics.

use crate::search::{Fact, Operator, OperatorId, Task};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// A condition or side effect on a child variable of a DTG, where
/// `local_var` indexes [`DomainTransitionGraph::local_to_global`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalAssignment {
    pub local_var: usize,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtgLabel {
    pub op: OperatorId,
    pub preconditions: Vec<LocalAssignment>,
    /// Effects on other child variables that happen whenever the label is
    /// used. Only collected on request.
    pub side_effects: Vec<LocalAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtgTransition {
    pub target: usize,
    pub labels: Vec<DtgLabel>,
}

/// Identifies one label of a DTG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRef {
    pub origin: usize,
    pub transition: usize,
    pub label: usize,
}

#[derive(Debug, Clone)]
pub struct DomainTransitionGraph {
    pub var: usize,
    /// Outgoing transitions per value of `var`.
    pub transitions: Vec<Vec<DtgTransition>>,
    /// Maps local child variables to task variables.
    pub local_to_global: Vec<usize>,
}

impl DomainTransitionGraph {
    /// Builds one DTG per task variable. Conditions on variable `u` in the
    /// DTG of `v` are dropped if `prune(v, u)` holds.
    pub fn build_all(
        task: &Task,
        collect_side_effects: bool,
        prune: impl Fn(usize, usize) -> bool,
    ) -> Vec<DomainTransitionGraph> {
        let mut builders: Vec<DtgBuilder> = (0..task.num_variables())
            .map(|var| DtgBuilder::new(var, task.domain_size(var)))
            .collect();
        for op in &task.operators {
            for effect in &op.effects {
                builders[effect.fact.var].add_effect(op, &effect.conditions, effect.fact, &prune);
            }
        }
        builders
            .into_iter()
            .map(|builder| builder.finish(task, collect_side_effects))
            .collect()
    }

    pub fn num_values(&self) -> usize {
        self.transitions.len()
    }

    pub fn label(&self, label: LabelRef) -> &DtgLabel {
        &self.transitions[label.origin][label.transition].labels[label.label]
    }
}

#[derive(Debug)]
struct DtgBuilder {
    var: usize,
    transitions: Vec<Vec<DtgTransition>>,
    transition_index: HashMap<(usize, usize), usize>,
    local_to_global: Vec<usize>,
    global_to_local: HashMap<usize, usize>,
}

impl DtgBuilder {
    fn new(var: usize, domain_size: usize) -> Self {
        Self {
            var,
            transitions: vec![vec![]; domain_size],
            transition_index: HashMap::new(),
            local_to_global: vec![],
            global_to_local: HashMap::new(),
        }
    }

    fn add_effect(
        &mut self,
        op: &Operator,
        effect_conditions: &[Fact],
        fact: Fact,
        prune: &impl Fn(usize, usize) -> bool,
    ) {
        let mut origin = None;
        let mut conditions = vec![];
        for pre in &op.preconditions {
            if pre.var == self.var {
                origin = Some(pre.value);
            } else if !prune(self.var, pre.var) {
                conditions.push(*pre);
            }
        }
        for cond in effect_conditions {
            if cond.var == self.var {
                if origin.is_some_and(|origin| origin != cond.value) {
                    // The effect can never fire.
                    return;
                }
                origin = Some(cond.value);
            } else if !prune(self.var, cond.var) {
                conditions.push(*cond);
            }
        }
        if origin == Some(fact.value) {
            return;
        }

        let preconditions: Vec<LocalAssignment> = conditions
            .into_iter()
            .map(|cond| LocalAssignment {
                local_var: self.local_var(cond.var),
                value: cond.value,
            })
            .collect();
        let label = DtgLabel {
            op: op.id,
            preconditions,
            side_effects: vec![],
        };
        match origin {
            Some(origin) => self.transition(origin, fact.value).labels.push(label),
            None => {
                for origin in (0..self.transitions.len()).filter(|&value| value != fact.value) {
                    self.transition(origin, fact.value).labels.push(label.clone());
                }
            }
        }
    }

    fn local_var(&mut self, global_var: usize) -> usize {
        *self.global_to_local.entry(global_var).or_insert_with(|| {
            self.local_to_global.push(global_var);
            self.local_to_global.len() - 1
        })
    }

    fn transition(&mut self, origin: usize, target: usize) -> &mut DtgTransition {
        let outgoing = &mut self.transitions[origin];
        let index = *self
            .transition_index
            .entry((origin, target))
            .or_insert_with(|| {
                outgoing.push(DtgTransition {
                    target,
                    labels: vec![],
                });
                outgoing.len() - 1
            });
        &mut outgoing[index]
    }

    fn finish(mut self, task: &Task, collect_side_effects: bool) -> DomainTransitionGraph {
        let mut transitions = std::mem::take(&mut self.transitions);
        for outgoing in &mut transitions {
            for transition in outgoing.iter_mut() {
                simplify_labels(task, &mut transition.labels);
                if collect_side_effects {
                    for label in &mut transition.labels {
                        label.side_effects = self.side_effects(task, label);
                    }
                }
            }
        }
        DomainTransitionGraph {
            var: self.var,
            transitions,
            local_to_global: self.local_to_global,
        }
    }

    /// Effects of the label's operator on child variables whose trigger
    /// condition is implied by the label's preconditions.
    fn side_effects(&self, task: &Task, label: &DtgLabel) -> Vec<LocalAssignment> {
        let label_conditions: HashSet<Fact> = label
            .preconditions
            .iter()
            .map(|assignment| Fact::new(self.local_to_global[assignment.local_var], assignment.value))
            .collect();
        let op = task.operator(label.op);
        op.effects
            .iter()
            .filter(|effect| effect.fact.var != self.var)
            .filter_map(|effect| {
                let local_var = *self.global_to_local.get(&effect.fact.var)?;
                let mut trigger = effect.conditions.clone();
                if let Some(pre) = op.precondition_on(effect.fact.var) {
                    trigger.push(Fact::new(effect.fact.var, pre));
                }
                trigger
                    .iter()
                    .all(|fact| label_conditions.contains(fact))
                    .then_some(LocalAssignment {
                        local_var,
                        value: effect.fact.value,
                    })
            })
            .collect()
    }
}

/// Removes labels whose condition equals or is a superset of the condition
/// of another label that costs no more. Only subsets of conditions with up to
/// five assignments are checked.
fn simplify_labels(task: &Task, labels: &mut Vec<DtgLabel>) {
    const MAX_SUBSET_CHECK: usize = 5;

    let key = |label: &DtgLabel| {
        let mut key = label.preconditions.clone();
        key.sort_unstable();
        key
    };
    let cost = |label: &DtgLabel| task.operator(label.op).cost;

    // The cheapest label (first on ties) for every condition.
    let mut best: HashMap<Vec<LocalAssignment>, usize> = HashMap::new();
    for (i, label) in labels.iter().enumerate() {
        best.entry(key(label))
            .and_modify(|j| {
                if cost(label) < cost(&labels[*j]) {
                    *j = i;
                }
            })
            .or_insert(i);
    }

    let keep: Vec<bool> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let key = key(label);
            if best[&key] != i {
                return false;
            }
            if key.len() > MAX_SUBSET_CHECK {
                return true;
            }
            !key.iter()
                .copied()
                .powerset()
                .filter(|subset| subset.len() < key.len())
                .any(|subset| {
                    best.get(&subset)
                        .is_some_and(|&j| cost(label) >= cost(&labels[j]))
                })
        })
        .collect();
    let mut keep = keep.into_iter();
    labels.retain(|_| keep.next().unwrap_or(false));
}
