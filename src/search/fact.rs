use std::fmt::{self, Display, Formatter};

/// A `(variable, value)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fact {
    pub var: usize,
    pub value: usize,
}

impl Fact {
    pub const fn new(var: usize, value: usize) -> Self {
        Self { var, value }
    }

    /// Whether the fact holds in the given (unpacked) state values.
    #[inline(always)]
    pub fn holds_in(&self, values: &[usize]) -> bool {
        values[self.var] == self.value
    }
}

impl Display for Fact {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

impl From<(usize, usize)> for Fact {
    fn from((var, value): (usize, usize)) -> Self {
        Self::new(var, value)
    }
}
