//! A plan is a sequence of operators that leads from the initial state to a
//! goal state. This module provides the [`Plan`] struct, which represents a
//! plan.

use crate::search::{Cost, OperatorId, Task};
use std::ops::Deref;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<OperatorId>,
}

impl Plan {
    pub fn empty() -> Self {
        Self { steps: vec![] }
    }

    pub fn new(steps: Vec<OperatorId>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[OperatorId] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The cost of the plan under the task's own operator costs.
    pub fn cost(&self, task: &Task) -> Cost {
        self.steps
            .iter()
            .fold(0, |total: Cost, &op| total.saturating_add(task.operator(op).cost))
    }

    /// Renders the plan in the usual `(operator name)` per line format, with
    /// a trailing cost comment.
    pub fn to_string(&self, task: &Task) -> String {
        let mut lines: Vec<String> = self
            .steps
            .iter()
            .map(|&op| format!("({})", task.operator(op).name))
            .collect();
        lines.push(format!(
            "; cost = {} ({})",
            self.cost(task),
            if task.is_unit_cost() {
                "unit cost"
            } else {
                "general cost"
            }
        ));
        lines.join("\n")
    }

    /// Replays the plan from the initial state, returning the final state
    /// values, or `None` if some operator is not applicable.
    pub fn execute(&self, task: &Task) -> Option<Vec<usize>> {
        let mut values = task.initial_state.clone();
        for &op in &self.steps {
            let operator = task.operator(op);
            if !operator.is_applicable(&values) {
                return None;
            }
            values = operator.apply(&values);
        }
        Some(values)
    }
}

impl IntoIterator for Plan {
    type Item = OperatorId;
    type IntoIter = std::vec::IntoIter<OperatorId>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl Deref for Plan {
    type Target = [OperatorId];

    fn deref(&self) -> &Self::Target {
        &self.steps
    }
}
