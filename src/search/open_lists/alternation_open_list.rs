use crate::search::open_lists::{EvaluationContext, OpenList};
use std::fmt::Debug;
use tracing::trace;

/// Priority reward of preferred-only sub-lists when the search progresses.
pub const DEFAULT_BOOST: i32 = 1000;

/// Alternates between sub-lists. Each removal takes from the non-empty
/// sub-list with the lowest priority counter (the first one on ties) and
/// increments that counter. Every entry is inserted into every sub-list.
#[derive(Debug)]
pub struct AlternationOpenList<E> {
    sublists: Vec<Box<dyn OpenList<E>>>,
    priorities: Vec<i64>,
    boost: i32,
}

impl<E> AlternationOpenList<E> {
    pub fn new(sublists: Vec<Box<dyn OpenList<E>>>, boost: i32) -> Self {
        assert!(!sublists.is_empty(), "alternation open list without sub-lists");
        Self {
            priorities: vec![0; sublists.len()],
            sublists,
            boost,
        }
    }
}

impl<E: Copy + Debug> OpenList<E> for AlternationOpenList<E> {
    fn insert(&mut self, context: &EvaluationContext, entry: E) {
        for sublist in &mut self.sublists {
            sublist.insert(context, entry);
        }
    }

    fn remove_min(&mut self) -> E {
        let best = (0..self.sublists.len())
            .filter(|&i| !self.sublists[i].is_empty())
            .min_by_key(|&i| self.priorities[i])
            .expect("remove_min on an empty open list");
        self.priorities[best] += 1;
        self.sublists[best].remove_min()
    }

    fn is_empty(&self) -> bool {
        self.sublists.iter().all(|sublist| sublist.is_empty())
    }

    /// Entries in all sub-lists, counting duplicates.
    fn len(&self) -> usize {
        self.sublists.iter().map(|sublist| sublist.len()).sum()
    }

    fn clear(&mut self) {
        for sublist in &mut self.sublists {
            sublist.clear();
        }
    }

    fn boost_preferred(&mut self) {
        for (sublist, priority) in self.sublists.iter_mut().zip(&mut self.priorities) {
            if sublist.only_contains_preferred_entries() {
                *priority -= i64::from(self.boost);
            }
            sublist.boost_preferred();
        }
        trace!(priorities = ?self.priorities, "boosted preferred open lists");
    }

    fn only_contains_preferred_entries(&self) -> bool {
        self.sublists
            .iter()
            .all(|sublist| sublist.only_contains_preferred_entries())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::HeuristicValue,
        open_lists::{BucketOpenList, KeyEvaluator},
    };

    fn greedy_lists() -> AlternationOpenList<u32> {
        AlternationOpenList::new(
            vec![
                Box::new(BucketOpenList::new(KeyEvaluator::H(0), false)),
                Box::new(BucketOpenList::new(KeyEvaluator::H(0), true)),
            ],
            DEFAULT_BOOST,
        )
    }

    fn insert(list: &mut AlternationOpenList<u32>, h: i32, preferred: bool, entry: u32) {
        let h_values = [HeuristicValue::Estimate(h)];
        list.insert(&EvaluationContext::new(0, &h_values, preferred), entry);
    }

    #[test]
    fn lists_take_turns() {
        let mut list = greedy_lists();
        insert(&mut list, 1, false, 1);
        insert(&mut list, 2, true, 2);
        insert(&mut list, 3, true, 3);
        assert_eq!(list.len(), 5);
        // Full list, preferred list, full list, preferred list.
        assert_eq!(list.remove_min(), 1);
        assert_eq!(list.remove_min(), 2);
        assert_eq!(list.remove_min(), 2);
        assert_eq!(list.remove_min(), 3);
        assert_eq!(list.remove_min(), 3);
        assert!(list.is_empty());
    }

    #[test]
    fn empty_sublists_are_skipped() {
        let mut list = greedy_lists();
        insert(&mut list, 1, false, 1);
        insert(&mut list, 2, false, 2);
        assert_eq!(list.remove_min(), 1);
        assert_eq!(list.remove_min(), 2);
        assert!(list.is_empty());
    }

    #[test]
    fn boost_favours_preferred_list() {
        let mut list = greedy_lists();
        for entry in 0..4 {
            insert(&mut list, 5, true, entry);
        }
        insert(&mut list, 0, false, 9);
        list.boost_preferred();
        // The preferred list wins until its counter catches up.
        for entry in 0..4 {
            assert_eq!(list.remove_min(), entry);
        }
        assert_eq!(list.remove_min(), 9);
        assert!(!list.only_contains_preferred_entries());
    }
}
