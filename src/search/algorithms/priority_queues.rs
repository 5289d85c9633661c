//! Integer-keyed priority queues for Dijkstra-style computations. Entries
//! with equal keys come out in insertion order.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use tracing::debug;

/// A bucket queue over non-negative keys. The cursor to the lowest non-empty
/// bucket only advances on [`BucketQueue::pop`] and moves back when a smaller
/// key is pushed, so `pop` is amortised O(1) for monotone key sequences and
/// still correct otherwise.
#[derive(Debug, Clone)]
pub struct BucketQueue<V> {
    buckets: Vec<VecDeque<V>>,
    current_bucket: usize,
    num_entries: usize,
    num_pushes: usize,
}

impl<V> Default for BucketQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BucketQueue<V> {
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            current_bucket: 0,
            num_entries: 0,
            num_pushes: 0,
        }
    }

    pub fn push(&mut self, key: usize, value: V) {
        self.num_entries += 1;
        self.num_pushes += 1;
        if key >= self.buckets.len() {
            self.buckets.resize_with(key + 1, VecDeque::new);
        }
        if key < self.current_bucket {
            self.current_bucket = key;
        }
        self.buckets[key].push_back(value);
    }

    /// Removes the oldest entry with the smallest key.
    ///
    /// # Panics
    /// If the queue is empty.
    pub fn pop(&mut self) -> (usize, V) {
        assert!(self.num_entries > 0, "pop on an empty bucket queue");
        while self.buckets[self.current_bucket].is_empty() {
            self.current_bucket += 1;
        }
        self.num_entries -= 1;
        let value = self.buckets[self.current_bucket]
            .pop_front()
            .unwrap_or_else(|| unreachable!());
        (self.current_bucket, value)
    }

    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    /// Removes all entries but keeps the allocated buckets.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut().skip(self.current_bucket) {
            if self.num_entries == 0 {
                break;
            }
            self.num_entries -= bucket.len();
            bucket.clear();
        }
        debug_assert_eq!(self.num_entries, 0);
        self.current_bucket = 0;
        self.num_pushes = 0;
    }

    /// Number of pushes since construction or the last clear.
    pub fn num_pushes(&self) -> usize {
        self.num_pushes
    }

    fn drain_sorted(&mut self) -> Vec<(usize, V)> {
        let mut entries = Vec::with_capacity(self.num_entries);
        for (key, bucket) in self.buckets.iter_mut().enumerate() {
            entries.extend(bucket.drain(..).map(|value| (key, value)));
        }
        self.buckets = Vec::new();
        self.current_bucket = 0;
        self.num_entries = 0;
        self.num_pushes = 0;
        entries
    }
}

#[derive(Debug, Clone)]
struct HeapEntry<V> {
    key: usize,
    sequence: u64,
    value: V,
}

impl<V> PartialEq for HeapEntry<V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<V> Eq for HeapEntry<V> {}

impl<V> PartialOrd for HeapEntry<V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<V> Ord for HeapEntry<V> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.key, self.sequence).cmp(&(other.key, other.sequence))
    }
}

/// A binary heap with FIFO tie-breaking, for keys too sparse for buckets.
#[derive(Debug, Clone)]
pub struct HeapQueue<V> {
    heap: BinaryHeap<Reverse<HeapEntry<V>>>,
    next_sequence: u64,
}

impl<V> Default for HeapQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> HeapQueue<V> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, key: usize, value: V) {
        self.heap.push(Reverse(HeapEntry {
            key,
            sequence: self.next_sequence,
            value,
        }));
        self.next_sequence += 1;
    }

    /// # Panics
    /// If the queue is empty.
    pub fn pop(&mut self) -> (usize, V) {
        match self.heap.pop() {
            Some(Reverse(entry)) => (entry.key, entry.value),
            None => panic!("pop on an empty heap queue"),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
    }
}

/// Number of buckets from which on a sparse key sequence makes the
/// [`AdaptiveQueue`] switch to a heap.
const BUCKET_THRESHOLD: usize = 100;

/// Starts as a [`BucketQueue`] and turns into a [`HeapQueue`] for good once a
/// key of at least [`BUCKET_THRESHOLD`] is pushed while fewer entries than
/// that key have been pushed since the last clear.
#[derive(Debug, Clone)]
pub enum AdaptiveQueue<V> {
    Buckets(BucketQueue<V>),
    Heap(HeapQueue<V>),
}

impl<V> Default for AdaptiveQueue<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> AdaptiveQueue<V> {
    pub fn new() -> Self {
        Self::Buckets(BucketQueue::new())
    }

    pub fn push(&mut self, key: usize, value: V) {
        match self {
            Self::Buckets(buckets) => {
                if key >= BUCKET_THRESHOLD && buckets.num_pushes() < key {
                    debug!(
                        key,
                        num_pushes = buckets.num_pushes(),
                        "adaptive queue switching from buckets to heap"
                    );
                    let mut heap = HeapQueue::new();
                    for (old_key, old_value) in buckets.drain_sorted() {
                        heap.push(old_key, old_value);
                    }
                    heap.push(key, value);
                    *self = Self::Heap(heap);
                } else {
                    buckets.push(key, value);
                }
            }
            Self::Heap(heap) => heap.push(key, value),
        }
    }

    pub fn pop(&mut self) -> (usize, V) {
        match self {
            Self::Buckets(buckets) => buckets.pop(),
            Self::Heap(heap) => heap.pop(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Buckets(buckets) => buckets.len(),
            Self::Heap(heap) => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        match self {
            Self::Buckets(buckets) => buckets.clear(),
            Self::Heap(heap) => heap.clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_queue_orders_by_key_then_fifo() {
        let mut queue = BucketQueue::new();
        for (key, name) in [(5, "a"), (3, "b"), (3, "c"), (7, "d"), (3, "e")] {
            queue.push(key, name);
        }
        let mut popped = vec![];
        while !queue.is_empty() {
            popped.push(queue.pop());
        }
        assert_eq!(
            popped,
            vec![(3, "b"), (3, "c"), (3, "e"), (5, "a"), (7, "d")]
        );
    }

    #[test]
    fn bucket_queue_accepts_smaller_key_after_pop() {
        let mut queue = BucketQueue::new();
        queue.push(4, 'x');
        assert_eq!(queue.pop(), (4, 'x'));
        queue.push(6, 'y');
        queue.push(1, 'z');
        assert_eq!(queue.pop(), (1, 'z'));
        assert_eq!(queue.pop(), (6, 'y'));
    }

    #[test]
    fn bucket_queue_clear() {
        let mut queue = BucketQueue::new();
        queue.push(2, ());
        queue.push(9, ());
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.num_pushes(), 0);
        queue.push(0, ());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    #[should_panic]
    fn bucket_queue_pop_empty_panics() {
        let mut queue: BucketQueue<usize> = BucketQueue::new();
        queue.pop();
    }

    #[test]
    fn heap_queue_is_fifo_on_ties() {
        let mut queue = HeapQueue::new();
        queue.push(10, 1);
        queue.push(2, 2);
        queue.push(10, 3);
        queue.push(2, 4);
        assert_eq!(queue.pop(), (2, 2));
        assert_eq!(queue.pop(), (2, 4));
        assert_eq!(queue.pop(), (10, 1));
        assert_eq!(queue.pop(), (10, 3));
    }

    #[test]
    fn adaptive_queue_switches_on_sparse_keys() {
        let mut queue = AdaptiveQueue::new();
        queue.push(3, 'a');
        queue.push(1, 'b');
        assert!(matches!(queue, AdaptiveQueue::Buckets(_)));
        queue.push(1000, 'c');
        assert!(matches!(queue, AdaptiveQueue::Heap(_)));
        queue.push(2, 'd');
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.pop(), (1, 'b'));
        assert_eq!(queue.pop(), (2, 'd'));
        assert_eq!(queue.pop(), (3, 'a'));
        assert_eq!(queue.pop(), (1000, 'c'));
        assert!(queue.is_empty());
    }
}
