//! Builds the decision tree of a [`SuccessorGenerator`].
//!
//! The operators are sorted lexicographically by their (variable-sorted)
//! preconditions. At recursion depth `d` an operator range is grouped by the
//! variable of the `d`-th precondition, operators without one form a leaf,
//! and each variable group is further grouped by the tested value. Every
//! value group is a contiguous range that shares its first `d + 1`
//! preconditions, so it is still sorted when recursing with depth `d + 1`.

use crate::search::{
    successor_generators::{successor_generator::GeneratorNode, SuccessorGenerator},
    Fact, OperatorId, Task,
};
use std::collections::HashMap;
use std::mem::size_of;
use std::ops::Range;
use tracing::debug;

#[derive(Debug)]
struct OperatorInfo {
    op: OperatorId,
    preconditions: Vec<Fact>,
}

impl OperatorInfo {
    /// The variable tested at `depth`, or `None` past the last precondition.
    fn var(&self, depth: usize) -> Option<usize> {
        self.preconditions.get(depth).map(|fact| fact.var)
    }

    fn value(&self, depth: usize) -> usize {
        self.preconditions[depth].value
    }
}

/// Splits `range` into maximal runs of equal keys.
fn group_by<K: PartialEq>(range: Range<usize>, key: impl Fn(usize) -> K) -> Vec<(K, Range<usize>)> {
    let mut groups = vec![];
    let mut begin = range.start;
    while begin < range.end {
        let group_key = key(begin);
        let mut end = begin + 1;
        while end < range.end && key(end) == group_key {
            end += 1;
        }
        groups.push((group_key, begin..end));
        begin = end;
    }
    groups
}

fn estimate_vector_bytes(num_elements: usize) -> usize {
    size_of::<Vec<Option<GeneratorNode>>>() + num_elements * size_of::<Option<GeneratorNode>>()
}

/// Mirrors the layout of a swiss table: one control byte per bucket, a load
/// factor of 7/8 and power-of-two capacities.
fn estimate_hash_map_bytes(num_entries: usize) -> usize {
    let num_buckets = (num_entries * 8 / 7 + 1).next_power_of_two();
    size_of::<HashMap<usize, GeneratorNode>>()
        + num_buckets * (size_of::<(usize, GeneratorNode)>() + 1)
}

#[derive(Debug)]
pub struct SuccessorGeneratorFactory<'a> {
    task: &'a Task,
    operator_infos: Vec<OperatorInfo>,
}

impl<'a> SuccessorGeneratorFactory<'a> {
    pub fn new(task: &'a Task) -> Self {
        Self {
            task,
            operator_infos: vec![],
        }
    }

    pub fn create(mut self) -> SuccessorGenerator {
        self.operator_infos = self
            .task
            .operators
            .iter()
            .map(|op| OperatorInfo {
                op: op.id,
                preconditions: op.preconditions.clone(),
            })
            .collect();
        // Stable, so ties keep operator id order.
        self.operator_infos
            .sort_by(|a, b| a.preconditions.cmp(&b.preconditions));
        let root = self.construct_recursive(0, 0..self.operator_infos.len());
        debug!(num_operators = self.operator_infos.len(), "built successor generator");
        SuccessorGenerator::from_root(root)
    }

    fn construct_recursive(&self, depth: usize, range: Range<usize>) -> GeneratorNode {
        let infos = &self.operator_infos;
        let mut nodes = vec![];
        for (var, var_range) in group_by(range, |i| infos[i].var(depth)) {
            match var {
                None => nodes.push(self.construct_leaf(var_range)),
                Some(var) => {
                    let children = group_by(var_range, |i| infos[i].value(depth))
                        .into_iter()
                        .map(|(value, value_range)| {
                            (value, self.construct_recursive(depth + 1, value_range))
                        })
                        .collect();
                    nodes.push(self.construct_switch(var, children));
                }
            }
        }
        Self::construct_fork(nodes)
    }

    fn construct_fork(mut nodes: Vec<GeneratorNode>) -> GeneratorNode {
        match nodes.len() {
            1 => nodes.swap_remove(0),
            2 => {
                let second = nodes.swap_remove(1);
                let first = nodes.swap_remove(0);
                GeneratorNode::ForkBinary(Box::new(first), Box::new(second))
            }
            _ => GeneratorNode::ForkMulti(nodes),
        }
    }

    fn construct_leaf(&self, range: Range<usize>) -> GeneratorNode {
        debug_assert!(!range.is_empty());
        if range.len() == 1 {
            GeneratorNode::LeafSingle(self.operator_infos[range.start].op)
        } else {
            GeneratorNode::LeafVector(self.operator_infos[range].iter().map(|info| info.op).collect())
        }
    }

    fn construct_switch(&self, var: usize, mut children: Vec<(usize, GeneratorNode)>) -> GeneratorNode {
        debug_assert!(!children.is_empty());
        if children.len() == 1 {
            let (value, child) = children.swap_remove(0);
            return GeneratorNode::SwitchSingle {
                var,
                value,
                child: Box::new(child),
            };
        }
        let domain_size = self.task.domain_size(var);
        if estimate_hash_map_bytes(children.len()) < estimate_vector_bytes(domain_size) {
            GeneratorNode::SwitchHash {
                var,
                children: children.into_iter().collect(),
            }
        } else {
            let mut by_value: Vec<Option<GeneratorNode>> = (0..domain_size).map(|_| None).collect();
            for (value, child) in children {
                by_value[value] = Some(child);
            }
            GeneratorNode::SwitchVector {
                var,
                children: by_value,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn groups_are_maximal_runs() {
        let keys = [1, 1, 2, 2, 2, 1];
        let groups = group_by(0..keys.len(), |i| keys[i]);
        assert_eq!(groups, vec![(1, 0..2), (2, 2..5), (1, 5..6)]);
    }

    #[test]
    fn hash_switch_only_pays_off_for_sparse_domains() {
        assert!(estimate_hash_map_bytes(2) > estimate_vector_bytes(3));
        assert!(estimate_hash_map_bytes(2) < estimate_vector_bytes(1000));
    }

    #[test]
    fn truck_tree_shape() {
        let task = Task::from_text(TRUCK_SAS_TEXT).unwrap();
        let factory = SuccessorGeneratorFactory::new(&task);
        let generator = factory.create();
        // Every operator tests the truck, so the root switches on it.
        let text = format!("{:?}", generator);
        assert!(text.contains("SwitchVector { var: 0"));
    }

    #[test]
    fn no_operators_gives_empty_fork() {
        let text = UNSOLVABLE_SAS_TEXT.replace(
            "1\nbegin_operator\ngo start trap\n0\n1\n0 0 0 1\n1\nend_operator\n",
            "0\n",
        );
        let task = Task::from_text(&text).unwrap();
        let generator = SuccessorGeneratorFactory::new(&task).create();
        let mut applicable = vec![];
        generator.generate_applicable_ops(&task.initial_state, &mut applicable);
        assert!(applicable.is_empty());
        assert!(format!("{:?}", generator).contains("ForkMulti([])"));
    }
}
