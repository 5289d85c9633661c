use crate::search::{
    algorithms::BucketQueue,
    open_lists::{EvaluationContext, KeyEvaluator, OpenList},
};

/// An open list with a single integer key. Entries with equal keys are
/// removed in insertion order.
#[derive(Debug)]
pub struct BucketOpenList<E> {
    queue: BucketQueue<E>,
    key: KeyEvaluator,
    preferred_only: bool,
}

impl<E> BucketOpenList<E> {
    pub fn new(key: KeyEvaluator, preferred_only: bool) -> Self {
        Self {
            queue: BucketQueue::new(),
            key,
            preferred_only,
        }
    }
}

impl<E: std::fmt::Debug> OpenList<E> for BucketOpenList<E> {
    fn insert(&mut self, context: &EvaluationContext, entry: E) {
        if self.preferred_only && !context.is_preferred {
            return;
        }
        if let Some(key) = self.key.key(context) {
            debug_assert!(key >= 0);
            self.queue.push(key as usize, entry);
        }
    }

    fn remove_min(&mut self) -> E {
        self.queue.pop().1
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }

    fn only_contains_preferred_entries(&self) -> bool {
        self.preferred_only
    }
}
