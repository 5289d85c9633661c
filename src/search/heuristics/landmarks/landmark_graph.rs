use crate::search::{Fact, OperatorId};
use std::collections::HashMap;

/// A fact that holds at some point of every plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landmark {
    pub fact: Fact,
    pub is_true_in_goal: bool,
    /// Operators that can make the fact true.
    pub possible_achievers: Vec<OperatorId>,
    /// Possible achievers that are relaxed applicable before the landmark
    /// has been reached for the first time.
    pub first_achievers: Vec<OperatorId>,
}

impl Landmark {
    pub fn is_true_in_state(&self, values: &[usize]) -> bool {
        self.fact.holds_in(values)
    }
}

/// Landmarks and the natural orderings between them. `a` is a parent of `b`
/// if `a` must be true some time before `b` first becomes true.
#[derive(Debug, Clone, Default)]
pub struct LandmarkGraph {
    landmarks: Vec<Landmark>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    fact_index: HashMap<Fact, usize>,
}

impl LandmarkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the fact as a landmark unless it already is one, and returns its
    /// id.
    pub fn add_landmark(&mut self, fact: Fact) -> usize {
        if let Some(&id) = self.fact_index.get(&fact) {
            return id;
        }
        let id = self.landmarks.len();
        self.landmarks.push(Landmark {
            fact,
            is_true_in_goal: false,
            possible_achievers: vec![],
            first_achievers: vec![],
        });
        self.parents.push(vec![]);
        self.children.push(vec![]);
        self.fact_index.insert(fact, id);
        id
    }

    /// Orders `from` before `to`. Adding an ordering twice has no effect.
    pub fn add_ordering(&mut self, from: usize, to: usize) {
        debug_assert_ne!(from, to);
        if !self.children[from].contains(&to) {
            self.children[from].push(to);
            self.parents[to].push(from);
        }
    }

    pub fn landmark_id(&self, fact: Fact) -> Option<usize> {
        self.fact_index.get(&fact).copied()
    }

    pub fn landmark(&self, id: usize) -> &Landmark {
        &self.landmarks[id]
    }

    pub fn landmark_mut(&mut self, id: usize) -> &mut Landmark {
        &mut self.landmarks[id]
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn num_landmarks(&self) -> usize {
        self.landmarks.len()
    }

    pub fn parents(&self, id: usize) -> &[usize] {
        &self.parents[id]
    }

    pub fn children(&self, id: usize) -> &[usize] {
        &self.children[id]
    }

    pub fn num_orderings(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmarks_are_unique() {
        let mut graph = LandmarkGraph::new();
        let a = graph.add_landmark(Fact::new(0, 1));
        let b = graph.add_landmark(Fact::new(1, 0));
        assert_eq!(graph.add_landmark(Fact::new(0, 1)), a);
        assert_eq!(graph.num_landmarks(), 2);
        assert_eq!(graph.landmark_id(Fact::new(1, 0)), Some(b));
        assert_eq!(graph.landmark_id(Fact::new(1, 1)), None);
    }

    #[test]
    fn orderings_are_unique() {
        let mut graph = LandmarkGraph::new();
        let a = graph.add_landmark(Fact::new(0, 1));
        let b = graph.add_landmark(Fact::new(1, 0));
        graph.add_ordering(a, b);
        graph.add_ordering(a, b);
        assert_eq!(graph.children(a), &[b]);
        assert_eq!(graph.parents(b), &[a]);
        assert!(graph.parents(a).is_empty());
        assert_eq!(graph.num_orderings(), 1);
    }
}
