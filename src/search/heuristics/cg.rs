use crate::search::{
    algorithms::AdaptiveQueue,
    heuristics::{
        cg_cache::CgCache,
        domain_transition_graph::{DomainTransitionGraph, LabelRef},
        Heuristic, HeuristicValue, PreferredOperators,
    },
    states::State,
    Cost, OperatorCost, OperatorId, Task, INFINITE_COST,
};
use std::rc::Rc;
use tracing::{debug, info};

/// Distances found by one Dijkstra search in a DTG.
#[derive(Debug, Clone)]
struct StartNode {
    distances: Vec<Cost>,
    /// The first label on a cheapest path to each value.
    helpful: Vec<Option<LabelRef>>,
}

/// The causal graph heuristic (Helmert, JAIR 2006). Goal values are reached
/// by Dijkstra searches in the domain transition graphs, where the cost of a
/// transition recursively includes the cost of achieving its conditions on
/// lower variables of the causal graph.
#[derive(Debug)]
pub struct CgHeuristic {
    task: Rc<Task>,
    costs: Vec<Cost>,
    min_action_cost: Cost,
    /// Only conditions on lower variables are kept.
    dtgs: Rc<Vec<DomainTransitionGraph>>,
    /// `start_nodes[var][value]` is filled lazily during one evaluation.
    start_nodes: Vec<Vec<Option<StartNode>>>,
    queues: Vec<AdaptiveQueue<usize>>,
    cache: CgCache,
    cache_hits: usize,
    cache_misses: usize,
    helpful_marked: Vec<bool>,
    preferred: PreferredOperators,
}

impl CgHeuristic {
    pub fn new(task: Rc<Task>, cost_type: OperatorCost, max_cache_size: usize) -> Self {
        let dtgs = DomainTransitionGraph::build_all(&task, false, |dtg_var, cond_var| {
            dtg_var <= cond_var
        });
        let costs = (0..task.operators.len())
            .map(|op| task.adjusted_cost(OperatorId(op), cost_type))
            .collect();
        let start_nodes = dtgs.iter().map(|dtg| vec![None; dtg.num_values()]).collect();
        let queues = (0..task.num_variables()).map(|_| AdaptiveQueue::new()).collect();
        let cache = CgCache::new(&task, max_cache_size);
        info!("causal graph heuristic initialized");
        Self {
            min_action_cost: task.min_operator_cost(cost_type),
            costs,
            dtgs: Rc::new(dtgs),
            start_nodes,
            queues,
            cache,
            cache_hits: 0,
            cache_misses: 0,
            helpful_marked: vec![false; task.num_variables()],
            preferred: PreferredOperators::new(task.operators.len()),
            task,
        }
    }

    fn transition_cost(&mut self, state: &[usize], var: usize, start: usize, goal: usize) -> Cost {
        if start == goal {
            return 0;
        }
        let use_cache = self.cache.is_cached(var);
        if use_cache {
            if let Some(cost) = self.cache.lookup(var, state, start, goal) {
                self.cache_hits += 1;
                return cost;
            }
        }
        self.cache_misses += 1;

        let node = match self.start_nodes[var][start].take() {
            Some(node) => node,
            None => self.dijkstra(state, var, start),
        };
        if use_cache {
            for value in (0..node.distances.len()).filter(|&value| value != start) {
                self.cache
                    .store(var, state, start, value, node.distances[value], node.helpful[value]);
            }
        }
        let cost = node.distances[goal];
        self.start_nodes[var][start] = Some(node);
        cost
    }

    fn dijkstra(&mut self, state: &[usize], var: usize, start: usize) -> StartNode {
        let dtgs = Rc::clone(&self.dtgs);
        let dtg = &dtgs[var];
        let num_values = dtg.num_values();
        let mut distances = vec![INFINITE_COST; num_values];
        let mut helpful: Vec<Option<LabelRef>> = vec![None; num_values];
        let mut reached_by: Vec<Option<LabelRef>> = vec![None; num_values];
        // Values of the child variables along the cheapest path to a value.
        let mut children_state: Vec<Vec<usize>> = vec![vec![]; num_values];
        distances[start] = 0;
        children_state[start] = dtg.local_to_global.iter().map(|&global| state[global]).collect();

        // Recursive calls only visit lower variables, so this queue is free.
        let mut queue = std::mem::take(&mut self.queues[var]);
        queue.clear();
        queue.push(0, start);
        while !queue.is_empty() {
            let (source_distance, source) = queue.pop();
            let source_distance = source_distance as Cost;
            if distances[source] < source_distance {
                continue;
            }
            if let Some(label_ref) = reached_by[source] {
                let mut context = children_state[label_ref.origin].clone();
                for assignment in &dtg.label(label_ref).preconditions {
                    context[assignment.local_var] = assignment.value;
                }
                children_state[source] = context;
            }

            for (transition_index, transition) in dtg.transitions[source].iter().enumerate() {
                let target = transition.target;
                for (label_index, label) in transition.labels.iter().enumerate() {
                    let mut new_distance = source_distance.saturating_add(self.costs[label.op.0]);
                    for assignment in &label.preconditions {
                        if new_distance >= distances[target] {
                            break;
                        }
                        let current = children_state[source][assignment.local_var];
                        let global_var = dtg.local_to_global[assignment.local_var];
                        let recursive_cost =
                            self.transition_cost(state, global_var, current, assignment.value);
                        new_distance = new_distance.saturating_add(recursive_cost);
                    }
                    new_distance = new_distance.max(self.min_action_cost);

                    if new_distance < distances[target] {
                        let label_ref = LabelRef {
                            origin: source,
                            transition: transition_index,
                            label: label_index,
                        };
                        distances[target] = new_distance;
                        reached_by[target] = Some(label_ref);
                        helpful[target] = Some(helpful[source].unwrap_or(label_ref));
                        queue.push(new_distance as usize, target);
                    }
                }
            }
        }
        self.queues[var] = queue;
        StartNode { distances, helpful }
    }

    /// Marks the operators of the first transitions towards `to` that are
    /// applicable in `state`, recursing into the conditions of transitions
    /// that are not. Every variable is visited once per evaluation.
    fn mark_helpful_transitions(&mut self, state: &[usize], var: usize, to: usize) {
        let from = state[var];
        if from == to || self.helpful_marked[var] {
            return;
        }
        self.helpful_marked[var] = true;

        let (helpful, cost) = if self.cache.is_cached(var) {
            (
                self.cache.lookup_helpful_transition(var, state, from, to),
                self.cache.lookup(var, state, from, to),
            )
        } else {
            match &self.start_nodes[var][from] {
                Some(node) => (node.helpful[to], Some(node.distances[to])),
                None => (None, None),
            }
        };
        let (Some(helpful), Some(cost)) = (helpful, cost) else {
            return;
        };

        let dtgs = Rc::clone(&self.dtgs);
        let dtg = &dtgs[var];
        let label = dtg.label(helpful);
        if cost == self.costs[label.op.0] && self.task.operator(label.op).is_applicable(state) {
            self.preferred.mark(label.op);
        } else {
            for assignment in &label.preconditions {
                let global_var = dtg.local_to_global[assignment.local_var];
                self.mark_helpful_transitions(state, global_var, assignment.value);
            }
        }
    }
}

impl Heuristic for CgHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        self.preferred.clear();
        for nodes in &mut self.start_nodes {
            nodes.fill(None);
        }
        self.helpful_marked.fill(false);

        let task = Rc::clone(&self.task);
        let values = state.values();
        let mut h: Cost = 0;
        for goal in &task.goal {
            let cost = self.transition_cost(values, goal.var, values[goal.var], goal.value);
            if cost == INFINITE_COST {
                return HeuristicValue::DeadEnd;
            }
            h = h.saturating_add(cost);
            self.mark_helpful_transitions(values, goal.var, goal.value);
        }
        debug!(
            h,
            cache_hits = self.cache_hits,
            cache_misses = self.cache_misses
        );
        HeuristicValue::from_cost(h)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        self.preferred.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::StateRegistry;
    use crate::test_utils::*;

    #[test]
    fn truck_initial_state() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = CgHeuristic::new(task, OperatorCost::Normal, 1_000_000);
        let initial = registry.initial_state();
        assert_eq!(heuristic.evaluate(&initial), HeuristicValue::Estimate(5));
        assert_eq!(heuristic.preferred_operators(), &[OperatorId(0)]);

        // Same context, so the second evaluation is answered by the cache.
        let hits = heuristic.cache_hits;
        assert_eq!(heuristic.evaluate(&initial), HeuristicValue::Estimate(5));
        assert!(heuristic.cache_hits > hits);
        assert_eq!(heuristic.preferred_operators(), &[OperatorId(0)]);
    }

    #[test]
    fn values_without_cache() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = CgHeuristic::new(task, OperatorCost::Normal, 0);
        let initial = registry.initial_state();
        assert_eq!(heuristic.evaluate(&initial), HeuristicValue::Estimate(5));
        // Package in the truck at b: unload at c needs the truck at c.
        let loaded = registry.register_values(&[1, 3]);
        assert_eq!(heuristic.evaluate(&loaded), HeuristicValue::Estimate(2));
        assert_eq!(heuristic.preferred_operators(), &[OperatorId(2)]);
    }

    #[test]
    fn unreachable_goal_is_a_dead_end() {
        let task = Rc::new(Task::from_text(DEAD_END_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let mut heuristic = CgHeuristic::new(task, OperatorCost::Normal, 1_000_000);
        let initial = registry.initial_state();
        assert_eq!(heuristic.evaluate(&initial), HeuristicValue::Estimate(2));
        let trap = registry.register_values(&[1]);
        assert!(heuristic.evaluate(&trap).is_dead_end());
        assert!(!heuristic.dead_ends_are_reliable());
    }
}
