use crate::search::{successor_generators::SuccessorGeneratorFactory, OperatorId, Task};
use std::collections::HashMap;

/// A node of the decision tree over operator preconditions.
#[derive(Debug)]
pub(super) enum GeneratorNode {
    /// Collects the operators of both children.
    ForkBinary(Box<GeneratorNode>, Box<GeneratorNode>),
    /// Collects the operators of all children. With no children this is the
    /// root of a task without operators.
    ForkMulti(Vec<GeneratorNode>),
    /// Descends into the child for the state's value of `var`, indexed
    /// directly by value.
    SwitchVector {
        var: usize,
        children: Vec<Option<GeneratorNode>>,
    },
    /// Like [`GeneratorNode::SwitchVector`], for switches where only a few
    /// values of a large domain have children.
    SwitchHash {
        var: usize,
        children: HashMap<usize, GeneratorNode>,
    },
    /// Descends into `child` iff `var` has `value`.
    SwitchSingle {
        var: usize,
        value: usize,
        child: Box<GeneratorNode>,
    },
    LeafSingle(OperatorId),
    LeafVector(Vec<OperatorId>),
}

impl GeneratorNode {
    fn generate_applicable_ops(&self, values: &[usize], applicable: &mut Vec<OperatorId>) {
        match self {
            GeneratorNode::ForkBinary(first, second) => {
                first.generate_applicable_ops(values, applicable);
                second.generate_applicable_ops(values, applicable);
            }
            GeneratorNode::ForkMulti(children) => {
                for child in children {
                    child.generate_applicable_ops(values, applicable);
                }
            }
            GeneratorNode::SwitchVector { var, children } => {
                if let Some(child) = &children[values[*var]] {
                    child.generate_applicable_ops(values, applicable);
                }
            }
            GeneratorNode::SwitchHash { var, children } => {
                if let Some(child) = children.get(&values[*var]) {
                    child.generate_applicable_ops(values, applicable);
                }
            }
            GeneratorNode::SwitchSingle { var, value, child } => {
                if values[*var] == *value {
                    child.generate_applicable_ops(values, applicable);
                }
            }
            GeneratorNode::LeafSingle(op) => applicable.push(*op),
            GeneratorNode::LeafVector(ops) => applicable.extend_from_slice(ops),
        }
    }
}

/// Finds the operators applicable in a state without testing every operator,
/// by walking a decision tree over the operators' preconditions.
#[derive(Debug)]
pub struct SuccessorGenerator {
    root: GeneratorNode,
}

impl SuccessorGenerator {
    pub fn new(task: &Task) -> Self {
        SuccessorGeneratorFactory::new(task).create()
    }

    pub(super) fn from_root(root: GeneratorNode) -> Self {
        Self { root }
    }

    /// Appends the ids of all operators applicable in `values` to
    /// `applicable`. Operators with equal preconditions appear in id order.
    pub fn generate_applicable_ops(&self, values: &[usize], applicable: &mut Vec<OperatorId>) {
        self.root.generate_applicable_ops(values, applicable);
    }
}
