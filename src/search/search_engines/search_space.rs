use crate::search::{
    search_engines::{SearchNode, SearchNodeStatus},
    states::{PerStateInformation, State, StateId, NO_STATE},
    Cost, OperatorId, Plan,
};
use tracing::debug;

/// The search nodes of all states a search has reached, stored per state of
/// the search's registry. Parent links are state ids, so plans are traced
/// back without touching the state buffers.
#[derive(Debug)]
pub struct SearchSpace {
    nodes: PerStateInformation<SearchNode>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSpace {
    pub fn new() -> Self {
        Self {
            nodes: PerStateInformation::new(SearchNode::default()),
        }
    }

    pub fn node(&self, state: &State) -> SearchNode {
        *self.nodes.get(state)
    }

    pub fn node_by_id(&self, id: StateId) -> SearchNode {
        *self.nodes.get_by_id(id)
    }

    pub fn open_initial(&mut self, state: &State) {
        let node = self.nodes.get_mut(state);
        debug_assert!(node.is_new());
        *node = SearchNode {
            status: SearchNodeStatus::Open,
            g: 0,
            real_g: 0,
            parent: NO_STATE,
            creating_operator: None,
        };
    }

    /// Opens a new node, or reopens a known one, with the given path.
    pub fn open(&mut self, state: &State, parent: StateId, op: OperatorId, g: Cost, real_g: Cost) {
        *self.nodes.get_mut(state) = SearchNode {
            status: SearchNodeStatus::Open,
            g,
            real_g,
            parent,
            creating_operator: Some(op),
        };
    }

    /// Re-parents a node without changing its status.
    pub fn update_parent(
        &mut self,
        state: &State,
        parent: StateId,
        op: OperatorId,
        g: Cost,
        real_g: Cost,
    ) {
        let node = self.nodes.get_mut(state);
        node.parent = parent;
        node.creating_operator = Some(op);
        node.g = g;
        node.real_g = real_g;
    }

    pub fn close(&mut self, state: &State) {
        let node = self.nodes.get_mut(state);
        debug_assert!(!node.is_dead_end());
        node.status = SearchNodeStatus::Closed;
    }

    pub fn mark_as_dead_end(&mut self, state: &State) {
        self.nodes.get_mut(state).status = SearchNodeStatus::DeadEnd;
    }

    /// The operators on the path to `goal_state`, from the initial state on.
    pub fn trace_path(&self, goal_state: &State) -> Plan {
        let mut steps = vec![];
        let mut current = self.node(goal_state);
        while let Some(op) = current.creating_operator {
            steps.push(op);
            current = self.node_by_id(current.parent);
        }
        steps.reverse();
        debug!(plan_length = steps.len(), "path traced");
        Plan::new(steps)
    }
}
