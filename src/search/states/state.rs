use std::fmt::{self, Display, Formatter};
use std::ops::Index;

/// Identifies a state within one [`StateRegistry`]. Ids are dense and start
/// at 0, so they index arenas directly.
///
/// [`StateRegistry`]: crate::search::states::StateRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for StateId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Placeholder parent of the initial state.
pub const NO_STATE: StateId = StateId(usize::MAX);

/// An unpacked view of a registered state. The packed buffer stays owned by
/// the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    registry_id: usize,
    id: StateId,
    values: Vec<usize>,
}

impl State {
    pub(crate) fn new(registry_id: usize, id: StateId, values: Vec<usize>) -> Self {
        Self {
            registry_id,
            id,
            values,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn registry_id(&self) -> usize {
        self.registry_id
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }
}

impl Index<usize> for State {
    type Output = usize;

    fn index(&self, var: usize) -> &usize {
        &self.values[var]
    }
}
