//! Contains the [`SasFact`] type.

/// A `var value` pair as it appears in mutex groups, goals, prevail and
/// effect conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SasFact {
    var: usize,
    value: usize,
}

impl SasFact {
    pub const fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }

    pub const fn var(&self) -> usize {
        self.var
    }

    pub const fn value(&self) -> usize {
        self.value
    }
}

impl From<(usize, usize)> for SasFact {
    fn from((var, value): (usize, usize)) -> Self {
        Self::new(var, value)
    }
}
