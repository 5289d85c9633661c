//! Successor generator for the regression search over an abstract state
//! space. Abstract states are identified by their perfect hash index and
//! operators by their index into the PDB's abstract operator list.

use crate::search::Fact;

#[derive(Debug, Default)]
struct Node {
    /// Operators whose regression preconditions have all been tested on the
    /// path to this node.
    applicable: Vec<usize>,
    /// `None` for a leaf.
    test: Option<Test>,
}

#[derive(Debug)]
struct Test {
    /// Index into the pattern.
    var: usize,
    successors: Vec<Option<Box<Node>>>,
    /// Followed for operators without a precondition on `var`.
    star: Option<Box<Node>>,
}

impl Test {
    fn new(var: usize, domain_size: usize) -> Self {
        Self {
            var,
            successors: (0..domain_size).map(|_| None).collect(),
            star: None,
        }
    }
}

/// Decision tree over partial abstract states. Node variables increase
/// along every path.
#[derive(Debug)]
pub struct MatchTree {
    hash_multipliers: Vec<usize>,
    domain_sizes: Vec<usize>,
    root: Option<Box<Node>>,
}

impl MatchTree {
    /// `domain_sizes` and `hash_multipliers` are indexed by pattern index.
    pub fn new(hash_multipliers: Vec<usize>, domain_sizes: Vec<usize>) -> Self {
        debug_assert_eq!(hash_multipliers.len(), domain_sizes.len());
        Self {
            hash_multipliers,
            domain_sizes,
            root: None,
        }
    }

    /// Inserts an operator. The facts of `preconditions` are over pattern
    /// indices and must be sorted.
    pub fn insert(&mut self, op: usize, preconditions: &[Fact]) {
        debug_assert!(preconditions.windows(2).all(|w| w[0].var < w[1].var));
        Self::insert_recursive(&self.domain_sizes, &mut self.root, op, preconditions);
    }

    fn insert_recursive(
        domain_sizes: &[usize],
        slot: &mut Option<Box<Node>>,
        op: usize,
        preconditions: &[Fact],
    ) {
        let Some((fact, rest)) = preconditions.split_first() else {
            slot.get_or_insert_with(Default::default).applicable.push(op);
            return;
        };
        // A node testing a later variable gets a new parent testing this one,
        // reached from the parent's star edge.
        let skips_var = slot
            .as_ref()
            .and_then(|node| node.test.as_ref())
            .is_some_and(|test| test.var > fact.var);
        if skips_var {
            let mut test = Test::new(fact.var, domain_sizes[fact.var]);
            test.star = slot.take();
            *slot = Some(Box::new(Node {
                applicable: vec![],
                test: Some(test),
            }));
        }
        let node = slot.get_or_insert_with(Default::default);
        let test = node
            .test
            .get_or_insert_with(|| Test::new(fact.var, domain_sizes[fact.var]));
        if test.var == fact.var {
            Self::insert_recursive(domain_sizes, &mut test.successors[fact.value], op, rest);
        } else {
            debug_assert!(test.var < fact.var);
            Self::insert_recursive(domain_sizes, &mut test.star, op, preconditions);
        }
    }

    /// Appends the operators whose regression preconditions hold in the
    /// abstract state with the given index.
    pub fn applicable_operators(&self, state_index: usize, operators: &mut Vec<usize>) {
        if let Some(root) = &self.root {
            self.collect(root, state_index, operators);
        }
    }

    fn collect(&self, node: &Node, state_index: usize, operators: &mut Vec<usize>) {
        operators.extend_from_slice(&node.applicable);
        let Some(test) = &node.test else {
            return;
        };
        let value = (state_index / self.hash_multipliers[test.var]) % self.domain_sizes[test.var];
        if let Some(child) = &test.successors[value] {
            self.collect(child, state_index, operators);
        }
        if let Some(star) = &test.star {
            self.collect(star, state_index, operators);
        }
    }
}
