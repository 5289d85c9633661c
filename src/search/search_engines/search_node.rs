use crate::search::{
    states::{StateId, NO_STATE},
    Cost, OperatorId, INFINITE_COST,
};
use strum_macros::EnumIs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum SearchNodeStatus {
    /// Not yet reached by the search
    New,
    /// Waiting in the open list
    Open,
    /// Expanded, or at least considered for expansion
    Closed,
    /// Pruned as a dead end
    DeadEnd,
}

/// Search information about one registered state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    pub status: SearchNodeStatus,
    /// Cost of the best known path under the adjusted operator costs.
    pub g: Cost,
    /// Cost of the same path under the task's own costs.
    pub real_g: Cost,
    pub parent: StateId,
    pub creating_operator: Option<OperatorId>,
}

impl Default for SearchNode {
    fn default() -> Self {
        Self {
            status: SearchNodeStatus::New,
            g: INFINITE_COST,
            real_g: INFINITE_COST,
            parent: NO_STATE,
            creating_operator: None,
        }
    }
}

impl SearchNode {
    pub fn is_new(&self) -> bool {
        self.status.is_new()
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_closed()
    }

    pub fn is_dead_end(&self) -> bool {
        self.status.is_dead_end()
    }
}
