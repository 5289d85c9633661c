use crate::search::{heuristics::domain_transition_graph::LabelRef, CausalGraph, Cost, Task};
use tracing::debug;

/// Transition costs of the causal graph heuristic, keyed by variable, start
/// and target value, and the values of every variable the variable
/// (transitively) depends on in the reduced causal graph. Those values fix
/// the outcome of the Dijkstra search, so entries stay valid across states.
#[derive(Debug)]
pub(super) struct CgCache {
    domain_sizes: Vec<usize>,
    depends_on: Vec<Vec<usize>>,
    costs: Vec<Vec<Option<Cost>>>,
    helpful_transitions: Vec<Vec<Option<LabelRef>>>,
}

impl CgCache {
    /// Variables that would need more than `max_cache_size` entries, or
    /// that depend on such a variable, are not cached.
    pub fn new(task: &Task, max_cache_size: usize) -> Self {
        let num_vars = task.num_variables();
        let causal_graph = CausalGraph::new(task);

        let mut depends_on = vec![vec![]; num_vars];
        for var in 0..num_vars {
            for &succ in causal_graph.pre_to_eff(var) {
                if succ > var {
                    depends_on[succ].push(var);
                }
            }
        }
        // Variables are a topological order of the reduced causal graph, so
        // the closure of every affector is complete before it is used.
        for var in 0..num_vars {
            let mut closure = depends_on[var].clone();
            for &affector in &depends_on[var] {
                closure.extend_from_slice(&depends_on[affector]);
            }
            closure.sort_unstable();
            closure.dedup();
            depends_on[var] = closure;
        }

        let domain_sizes = task.domain_sizes();
        let mut costs: Vec<Vec<Option<Cost>>> = Vec::with_capacity(num_vars);
        let mut helpful_transitions = Vec::with_capacity(num_vars);
        for var in 0..num_vars {
            let size =
                required_cache_size(var, &depends_on[var], &domain_sizes, &costs, max_cache_size)
                    .unwrap_or(0);
            costs.push(vec![None; size]);
            helpful_transitions.push(vec![None; size]);
        }
        let num_cached = costs.iter().filter(|entries| !entries.is_empty()).count();
        debug!(num_cached, num_vars, "causal graph heuristic cache");

        Self {
            domain_sizes,
            depends_on,
            costs,
            helpful_transitions,
        }
    }

    pub fn is_cached(&self, var: usize) -> bool {
        !self.costs[var].is_empty()
    }

    fn index(&self, var: usize, state: &[usize], from: usize, to: usize) -> usize {
        debug_assert!(self.is_cached(var));
        debug_assert_ne!(from, to);
        let mut index = from;
        let mut multiplier = self.domain_sizes[var];
        for &dep in &self.depends_on[var] {
            index += state[dep] * multiplier;
            multiplier *= self.domain_sizes[dep];
        }
        let to = if to > from { to - 1 } else { to };
        index + to * multiplier
    }

    pub fn lookup(&self, var: usize, state: &[usize], from: usize, to: usize) -> Option<Cost> {
        self.costs[var][self.index(var, state, from, to)]
    }

    pub fn lookup_helpful_transition(
        &self,
        var: usize,
        state: &[usize],
        from: usize,
        to: usize,
    ) -> Option<LabelRef> {
        self.helpful_transitions[var][self.index(var, state, from, to)]
    }

    pub fn store(
        &mut self,
        var: usize,
        state: &[usize],
        from: usize,
        to: usize,
        cost: Cost,
        helpful: Option<LabelRef>,
    ) {
        let index = self.index(var, state, from, to);
        self.costs[var][index] = Some(cost);
        self.helpful_transitions[var][index] = helpful;
    }
}

/// `None` if the variable cannot be cached.
fn required_cache_size(
    var: usize,
    depends_on: &[usize],
    domain_sizes: &[usize],
    allocated: &[Vec<Option<Cost>>],
    max_cache_size: usize,
) -> Option<usize> {
    let domain_size = domain_sizes[var];
    let mut size = domain_size
        .checked_mul(domain_size.saturating_sub(1))
        .filter(|&size| size <= max_cache_size)?;
    for &dep in depends_on {
        // Dependencies on uncached variables rule out caching.
        if allocated[dep].is_empty() {
            return None;
        }
        size = size
            .checked_mul(domain_sizes[dep])
            .filter(|&size| size <= max_cache_size)?;
    }
    Some(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn truck_cache_layout() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let cache = CgCache::new(&task, 1_000_000);
        assert_eq!(cache.depends_on, vec![vec![], vec![0]]);
        assert_eq!(cache.costs[0].len(), 6);
        assert_eq!(cache.costs[1].len(), 36);
    }

    #[test]
    fn indices_are_distinct() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let cache = CgCache::new(&task, 1_000_000);
        let mut seen = std::collections::HashSet::new();
        for truck in 0..3 {
            for from in 0..4 {
                for to in (0..4).filter(|&to| to != from) {
                    assert!(seen.insert(cache.index(1, &[truck, 0], from, to)));
                }
            }
        }
        assert_eq!(seen.len(), 36);
        assert!(seen.iter().all(|&index| index < 36));
    }

    #[test]
    fn small_limit_disables_dependent_caches() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let cache = CgCache::new(&task, 10);
        assert!(cache.is_cached(0));
        assert!(!cache.is_cached(1));
    }
}
