//! Landmark generation by label propagation in the relaxed planning graph
//! (Zhu and Givan, ICAPS 2003 doctoral consortium). Every reached fact is
//! labelled with the facts that are true on all relaxed paths to it; the
//! labels of goal facts are landmarks, ordered naturally before the goal.

use crate::search::{
    heuristics::landmarks::LandmarkGraph, Fact, Operator, OperatorId, Task,
};
use std::collections::BTreeSet;
use tracing::{info, warn};

type Labels = BTreeSet<Fact>;

/// Labels of every fact, indexed by variable and value. A fact is reached
/// iff its label set is non-empty, since it always contains the fact.
type PropositionLayer = Vec<Vec<Labels>>;

pub fn generate_zhu_givan_landmarks(task: &Task) -> LandmarkGraph {
    let layer = build_relaxed_plan_graph_with_labels(task);
    let mut graph = LandmarkGraph::new();

    if let Some(goal) = task
        .goal
        .iter()
        .find(|goal| layer[goal.var][goal.value].is_empty())
    {
        // Without achievers this landmark makes the initial state a dead end.
        warn!(%goal, "goal is unreachable even in the relaxed task");
        let id = graph.add_landmark(*goal);
        graph.landmark_mut(id).is_true_in_goal = true;
        return graph;
    }

    for goal in &task.goal {
        let goal_id = graph.add_landmark(*goal);
        graph.landmark_mut(goal_id).is_true_in_goal = true;
        for &fact in layer[goal.var][goal.value].iter().filter(|&fact| fact != goal) {
            let id = graph.add_landmark(fact);
            graph.add_ordering(id, goal_id);
        }
    }
    compute_achievers(task, &mut graph);
    info!(
        num_landmarks = graph.num_landmarks(),
        num_orderings = graph.num_orderings(),
        "landmarks generated"
    );
    graph
}

/// Operators to reconsider when the labels of a fact change: those with the
/// fact as precondition or effect condition.
fn compute_triggers(task: &Task) -> Vec<Vec<Vec<usize>>> {
    let mut triggers: Vec<Vec<Vec<usize>>> = (0..task.num_variables())
        .map(|var| vec![vec![]; task.domain_size(var)])
        .collect();
    for (op_id, op) in task.operators.iter().enumerate() {
        let conditions: BTreeSet<Fact> = op
            .preconditions
            .iter()
            .chain(op.effects.iter().flat_map(|effect| &effect.conditions))
            .copied()
            .collect();
        for fact in conditions {
            triggers[fact.var][fact.value].push(op_id);
        }
    }
    triggers
}

fn build_relaxed_plan_graph_with_labels(task: &Task) -> PropositionLayer {
    let triggers = compute_triggers(task);
    let mut current: PropositionLayer = (0..task.num_variables())
        .map(|var| vec![Labels::new(); task.domain_size(var)])
        .collect();
    let mut triggered = BTreeSet::new();
    for (var, &value) in task.initial_state.iter().enumerate() {
        current[var][value].insert(Fact::new(var, value));
        triggered.extend(&triggers[var][value]);
    }
    // Without preconditions an operator propagates no labels, so one
    // application suffices unless effect conditions trigger it again.
    triggered.extend(
        task.operators
            .iter()
            .filter(|op| op.preconditions.is_empty())
            .map(|op| op.id.0),
    );

    loop {
        let mut next = current.clone();
        let mut next_triggered = BTreeSet::new();
        for &op_id in &triggered {
            let op = &task.operators[op_id];
            if !op.preconditions.iter().all(|pre| is_reached(&current, pre)) {
                continue;
            }
            for fact in apply_operator_and_propagate_labels(op, &current, &mut next) {
                next_triggered.extend(&triggers[fact.var][fact.value]);
            }
        }
        current = next;
        if next_triggered.is_empty() {
            return current;
        }
        triggered = next_triggered;
    }
}

fn is_reached(layer: &PropositionLayer, fact: &Fact) -> bool {
    !layer[fact.var][fact.value].is_empty()
}

fn union_of_labels<'a>(facts: impl Iterator<Item = &'a Fact>, layer: &PropositionLayer) -> Labels {
    let mut union = Labels::new();
    for fact in facts {
        union.extend(&layer[fact.var][fact.value]);
    }
    union
}

/// Returns the effect facts whose labels changed.
fn apply_operator_and_propagate_labels(
    op: &Operator,
    current: &PropositionLayer,
    next: &mut PropositionLayer,
) -> Vec<Fact> {
    let precondition_labels = union_of_labels(op.preconditions.iter(), current);
    let mut changed = vec![];
    for effect in &op.effects {
        let fact = effect.fact;
        let labels = &mut next[fact.var][fact.value];
        if labels.len() == 1 {
            continue;
        }
        if !effect.conditions.iter().all(|cond| is_reached(current, cond)) {
            continue;
        }
        let mut new_labels = precondition_labels.clone();
        new_labels.extend(union_of_labels(effect.conditions.iter(), current));

        let old_size = labels.len();
        if labels.is_empty() {
            *labels = new_labels;
        } else {
            labels.retain(|label| new_labels.contains(label));
        }
        labels.insert(fact);
        if labels.len() != old_size {
            changed.push(fact);
        }
    }
    changed
}

/// Relaxed reachability from the initial state where `excluded` never
/// becomes true.
fn relaxed_reachable_without(task: &Task, excluded: Fact) -> Vec<Vec<bool>> {
    let mut reached: Vec<Vec<bool>> = (0..task.num_variables())
        .map(|var| vec![false; task.domain_size(var)])
        .collect();
    for (var, &value) in task.initial_state.iter().enumerate() {
        reached[var][value] = Fact::new(var, value) != excluded;
    }
    let holds = |reached: &Vec<Vec<bool>>, fact: &Fact| reached[fact.var][fact.value];
    let mut changed = true;
    while changed {
        changed = false;
        for op in &task.operators {
            if !op.preconditions.iter().all(|pre| holds(&reached, pre)) {
                continue;
            }
            for effect in &op.effects {
                let fact = effect.fact;
                if fact != excluded
                    && !reached[fact.var][fact.value]
                    && effect.conditions.iter().all(|cond| holds(&reached, cond))
                {
                    reached[fact.var][fact.value] = true;
                    changed = true;
                }
            }
        }
    }
    reached
}

fn compute_achievers(task: &Task, graph: &mut LandmarkGraph) {
    for id in 0..graph.num_landmarks() {
        let fact = graph.landmark(id).fact;
        let reachable = relaxed_reachable_without(task, fact);
        let mut possible_achievers = vec![];
        let mut first_achievers = vec![];
        for op in &task.operators {
            let Some(effect) = op.effects.iter().find(|effect| effect.fact == fact) else {
                continue;
            };
            possible_achievers.push(op.id);
            if op
                .preconditions
                .iter()
                .chain(&effect.conditions)
                .all(|cond| reachable[cond.var][cond.value])
            {
                first_achievers.push(op.id);
            }
        }
        let landmark = graph.landmark_mut(id);
        landmark.possible_achievers = possible_achievers;
        landmark.first_achievers = first_achievers;
    }
}
