use crate::search::{
    open_lists::{EvaluationContext, KeyEvaluator, OpenList},
    Cost,
};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;

/// An open list ordered lexicographically by a vector of keys, with FIFO
/// order among entries whose keys are all equal.
#[derive(Debug)]
pub struct TieBreakingOpenList<E> {
    buckets: BTreeMap<Vec<Cost>, VecDeque<E>>,
    keys: Vec<KeyEvaluator>,
    preferred_only: bool,
    size: usize,
}

impl<E> TieBreakingOpenList<E> {
    pub fn new(keys: Vec<KeyEvaluator>, preferred_only: bool) -> Self {
        assert!(!keys.is_empty(), "tie-breaking open list without keys");
        Self {
            buckets: BTreeMap::new(),
            keys,
            preferred_only,
            size: 0,
        }
    }
}

impl<E: Debug> OpenList<E> for TieBreakingOpenList<E> {
    fn insert(&mut self, context: &EvaluationContext, entry: E) {
        if self.preferred_only && !context.is_preferred {
            return;
        }
        let Some(key) = self
            .keys
            .iter()
            .map(|evaluator| evaluator.key(context))
            .collect::<Option<Vec<Cost>>>()
        else {
            return;
        };
        self.buckets.entry(key).or_default().push_back(entry);
        self.size += 1;
    }

    fn remove_min(&mut self) -> E {
        let mut bucket = self
            .buckets
            .first_entry()
            .expect("remove_min on an empty open list");
        let entry = bucket.get_mut().pop_front().unwrap_or_else(|| unreachable!());
        if bucket.get().is_empty() {
            bucket.remove();
        }
        self.size -= 1;
        entry
    }

    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn len(&self) -> usize {
        self.size
    }

    fn clear(&mut self) {
        self.buckets.clear();
        self.size = 0;
    }

    fn only_contains_preferred_entries(&self) -> bool {
        self.preferred_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::heuristics::HeuristicValue;

    #[test]
    fn lexicographic_order() {
        let f = KeyEvaluator::Sum(vec![KeyEvaluator::G, KeyEvaluator::H(0)]);
        let mut list = TieBreakingOpenList::new(vec![f, KeyEvaluator::H(0)], false);
        // (g, h) pairs: f ties are broken by the smaller h, then FIFO.
        for (g, h, entry) in [(1, 4, 'a'), (3, 2, 'b'), (0, 6, 'c'), (4, 1, 'd'), (3, 2, 'e')] {
            let h_values = [HeuristicValue::Estimate(h)];
            list.insert(&EvaluationContext::new(g, &h_values, false), entry);
        }
        assert_eq!(list.len(), 5);
        let mut order = vec![];
        while !list.is_empty() {
            order.push(list.remove_min());
        }
        assert_eq!(order, vec!['d', 'b', 'e', 'a', 'c']);
    }

    #[test]
    fn dead_ends_are_dropped() {
        let mut list = TieBreakingOpenList::new(vec![KeyEvaluator::G, KeyEvaluator::H(0)], false);
        let h_values = [HeuristicValue::DeadEnd];
        list.insert(&EvaluationContext::new(0, &h_values, true), 'a');
        assert!(list.is_empty());
    }

    #[test]
    #[should_panic]
    fn remove_from_empty_list() {
        let mut list: TieBreakingOpenList<char> =
            TieBreakingOpenList::new(vec![KeyEvaluator::G], false);
        list.remove_min();
    }
}
