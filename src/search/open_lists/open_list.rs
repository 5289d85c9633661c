use crate::search::{heuristics::HeuristicValue, Cost};
use std::fmt::Debug;

/// What the open lists know about an entry when it is inserted.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub g: Cost,
    /// One value per heuristic of the search, in configuration order.
    pub h_values: &'a [HeuristicValue],
    pub is_preferred: bool,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(g: Cost, h_values: &'a [HeuristicValue], is_preferred: bool) -> Self {
        Self {
            g,
            h_values,
            is_preferred,
        }
    }
}

/// Computes an open list key from an [`EvaluationContext`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvaluator {
    G,
    /// The value of the heuristic with the given index.
    H(usize),
    Sum(Vec<KeyEvaluator>),
    Weighted(Box<KeyEvaluator>, Cost),
}

impl KeyEvaluator {
    /// The key, or `None` if a heuristic it depends on reports a dead end.
    pub fn key(&self, context: &EvaluationContext) -> Option<Cost> {
        match self {
            KeyEvaluator::G => Some(context.g),
            KeyEvaluator::H(index) => match context.h_values[*index] {
                HeuristicValue::Estimate(h) => Some(h),
                HeuristicValue::DeadEnd => None,
            },
            KeyEvaluator::Sum(summands) => summands.iter().try_fold(0, |sum: Cost, summand| {
                summand.key(context).map(|key| sum.saturating_add(key))
            }),
            KeyEvaluator::Weighted(inner, weight) => inner
                .key(context)
                .map(|key| key.saturating_mul(*weight)),
        }
    }
}

/// A priority queue over search entries.
pub trait OpenList<E>: Debug {
    /// Inserts the entry. Lists may drop it, for example if its key is a
    /// dead end or the list only accepts preferred entries.
    fn insert(&mut self, context: &EvaluationContext, entry: E);

    /// Removes an entry with the smallest key.
    ///
    /// # Panics
    /// If the list is empty.
    fn remove_min(&mut self) -> E;

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;

    fn clear(&mut self);

    /// Called when the search makes progress. Alternation lists use this to
    /// favour their preferred-only sub-lists.
    fn boost_preferred(&mut self) {}

    /// Whether only preferred entries are ever inserted into the list.
    fn only_contains_preferred_entries(&self) -> bool;
}
