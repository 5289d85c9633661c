use crate::search::{Cost, Fact};
use std::fmt::{self, Display, Formatter};

/// Index of an operator in [`Task::operators`](crate::search::Task::operators).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperatorId(pub usize);

impl Display for OperatorId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

/// An effect sets `fact` when all of its `conditions` hold in the state the
/// operator is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Effect {
    pub conditions: Vec<Fact>,
    pub fact: Fact,
}

impl Effect {
    #[inline(always)]
    pub fn does_fire(&self, values: &[usize]) -> bool {
        self.conditions.iter().all(|cond| cond.holds_in(values))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    /// Sorted by variable, at most one fact per variable.
    pub preconditions: Vec<Fact>,
    pub effects: Vec<Effect>,
    /// The cost as given by the task, before any [`OperatorCost`]
    /// adjustment.
    ///
    /// [`OperatorCost`]: crate::search::OperatorCost
    pub cost: Cost,
}

impl Operator {
    pub fn is_applicable(&self, values: &[usize]) -> bool {
        self.preconditions.iter().all(|pre| pre.holds_in(values))
    }

    /// Applies the operator to unpacked state values. All effect conditions
    /// are evaluated in `values`, not in the partially updated result.
    pub fn apply(&self, values: &[usize]) -> Vec<usize> {
        debug_assert!(self.is_applicable(values));
        let mut successor = values.to_vec();
        for effect in &self.effects {
            if effect.does_fire(values) {
                successor[effect.fact.var] = effect.fact.value;
            }
        }
        successor
    }

    /// The precondition on `var`, if there is one.
    pub fn precondition_on(&self, var: usize) -> Option<usize> {
        self.preconditions
            .binary_search_by_key(&var, |pre| pre.var)
            .ok()
            .map(|index| self.preconditions[index].value)
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.effects.iter().any(|eff| !eff.conditions.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toggle() -> Operator {
        Operator {
            id: OperatorId(0),
            name: "toggle".to_string(),
            preconditions: vec![Fact::new(0, 0)],
            effects: vec![
                Effect {
                    conditions: vec![],
                    fact: Fact::new(0, 1),
                },
                Effect {
                    conditions: vec![Fact::new(0, 0), Fact::new(1, 1)],
                    fact: Fact::new(2, 1),
                },
            ],
            cost: 1,
        }
    }

    #[test]
    fn conditional_effects_use_old_values() {
        let op = toggle();
        assert_eq!(op.apply(&[0, 1, 0]), vec![1, 1, 1]);
        assert_eq!(op.apply(&[0, 0, 0]), vec![1, 0, 0]);
    }

    #[test]
    fn precondition_lookup() {
        let op = toggle();
        assert_eq!(op.precondition_on(0), Some(0));
        assert_eq!(op.precondition_on(1), None);
        assert!(!op.is_applicable(&[1, 0, 0]));
        assert!(op.has_conditional_effects());
    }
}
