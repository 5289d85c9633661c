//! The context-enhanced additive heuristic (Helmert and Geffner, ICAPS
//! 2008). One Dijkstra-like exploration runs over lazily created local
//! problems, one per variable and start value, where each node carries the
//! context (values of the child variables) under which it was reached.

use crate::search::{
    algorithms::AdaptiveQueue,
    heuristics::{
        domain_transition_graph::{DomainTransitionGraph, LocalAssignment},
        Heuristic, HeuristicValue, PreferredOperators,
    },
    states::State,
    Cost, OperatorCost, OperatorId, Task, INFINITE_COST,
};
use std::rc::Rc;
use tracing::info;

const GOAL_PROBLEM: usize = 0;
const GOAL_NODE: NodeRef = NodeRef {
    problem: GOAL_PROBLEM,
    node: 1,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeRef {
    problem: usize,
    node: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TransitionRef {
    problem: usize,
    transition: usize,
}

#[derive(Debug)]
struct LocalTransition {
    source: usize,
    target: usize,
    /// `None` for the transition of the goal problem.
    op: Option<OperatorId>,
    preconditions: Vec<LocalAssignment>,
    side_effects: Vec<LocalAssignment>,
    action_cost: Cost,
    target_cost: Cost,
    unreached_conditions: usize,
}

#[derive(Debug)]
struct LocalNode {
    outgoing: Vec<usize>,
    cost: Cost,
    expanded: bool,
    context: Vec<usize>,
    /// Before expansion the best transition into this node, afterwards the
    /// first transition on a cheapest path from the start.
    reached_by: Option<usize>,
    waiting_list: Vec<TransitionRef>,
}

impl LocalNode {
    fn new() -> Self {
        Self {
            outgoing: vec![],
            cost: INFINITE_COST,
            expanded: false,
            context: vec![],
            reached_by: None,
            waiting_list: vec![],
        }
    }
}

#[derive(Debug)]
struct LocalProblem {
    /// `None` while the problem is not part of the current evaluation.
    base_priority: Option<Cost>,
    context_variables: Vec<usize>,
    nodes: Vec<LocalNode>,
    transitions: Vec<LocalTransition>,
}

impl LocalProblem {
    fn add_transition(&mut self, transition: LocalTransition) {
        self.nodes[transition.source].outgoing.push(self.transitions.len());
        self.transitions.push(transition);
    }
}

#[derive(Debug)]
pub struct CeaHeuristic {
    task: Rc<Task>,
    costs: Vec<Cost>,
    min_action_cost: Cost,
    dtgs: Vec<DomainTransitionGraph>,
    /// The goal problem comes first, the others are created on demand.
    problems: Vec<LocalProblem>,
    problem_index: Vec<Vec<Option<usize>>>,
    queue: AdaptiveQueue<NodeRef>,
    preferred: PreferredOperators,
}

impl CeaHeuristic {
    pub fn new(task: Rc<Task>, cost_type: OperatorCost) -> Self {
        let dtgs = DomainTransitionGraph::build_all(&task, true, |_, _| false);
        let costs = (0..task.operators.len())
            .map(|op| task.adjusted_cost(OperatorId(op), cost_type))
            .collect();
        let problem_index = dtgs.iter().map(|dtg| vec![None; dtg.num_values()]).collect();
        info!("context-enhanced additive heuristic initialized");
        Self {
            min_action_cost: task.min_operator_cost(cost_type),
            costs,
            dtgs,
            problems: vec![goal_problem(&task)],
            problem_index,
            queue: AdaptiveQueue::new(),
            preferred: PreferredOperators::new(task.operators.len()),
            task,
        }
    }

    fn local_problem(&mut self, var: usize, value: usize) -> usize {
        if let Some(problem) = self.problem_index[var][value] {
            return problem;
        }
        let dtg = &self.dtgs[var];
        let mut problem = LocalProblem {
            base_priority: None,
            context_variables: dtg.local_to_global.clone(),
            nodes: (0..dtg.num_values()).map(|_| LocalNode::new()).collect(),
            transitions: vec![],
        };
        for (source, outgoing) in dtg.transitions.iter().enumerate() {
            for transition in outgoing {
                for label in &transition.labels {
                    problem.add_transition(LocalTransition {
                        source,
                        target: transition.target,
                        op: Some(label.op),
                        preconditions: label.preconditions.clone(),
                        side_effects: label.side_effects.clone(),
                        action_cost: self.costs[label.op.0],
                        target_cost: 0,
                        unreached_conditions: 0,
                    });
                }
            }
        }
        let index = self.problems.len();
        self.problems.push(problem);
        self.problem_index[var][value] = Some(index);
        index
    }

    fn node(&self, node: NodeRef) -> &LocalNode {
        &self.problems[node.problem].nodes[node.node]
    }

    fn node_mut(&mut self, node: NodeRef) -> &mut LocalNode {
        &mut self.problems[node.problem].nodes[node.node]
    }

    fn transition_mut(&mut self, transition: TransitionRef) -> &mut LocalTransition {
        &mut self.problems[transition.problem].transitions[transition.transition]
    }

    /// The lowest overall cost at which the node matters.
    fn priority(&self, node: NodeRef) -> Cost {
        let base = self.problems[node.problem].base_priority.unwrap_or(0);
        base.saturating_add(self.node(node).cost)
    }

    fn push(&mut self, node: NodeRef) {
        let priority = self.priority(node);
        self.queue.push(priority as usize, node);
    }

    fn set_up_local_problem(
        &mut self,
        problem: usize,
        base_priority: Cost,
        start: usize,
        state: &[usize],
    ) {
        let local = &mut self.problems[problem];
        debug_assert!(local.base_priority.is_none());
        local.base_priority = Some(base_priority);
        for node in &mut local.nodes {
            node.expanded = false;
            node.cost = INFINITE_COST;
            node.waiting_list.clear();
            node.reached_by = None;
        }
        let context = local.context_variables.iter().map(|&var| state[var]).collect();
        let start_node = &mut local.nodes[start];
        start_node.cost = 0;
        start_node.context = context;
        self.push(NodeRef {
            problem,
            node: start,
        });
    }

    fn try_to_fire(&mut self, transition: TransitionRef) {
        let local = &self.problems[transition.problem];
        let trans = &local.transitions[transition.transition];
        if trans.unreached_conditions > 0 {
            return;
        }
        let (target, target_cost) = (trans.target, trans.target_cost);
        let target_ref = NodeRef {
            problem: transition.problem,
            node: target,
        };
        let target_node = self.node_mut(target_ref);
        if target_cost < target_node.cost {
            target_node.cost = target_cost;
            target_node.reached_by = Some(transition.transition);
            self.push(target_ref);
        }
    }

    fn expand_node(&mut self, node_ref: NodeRef) {
        let local = &mut self.problems[node_ref.problem];
        local.nodes[node_ref.node].expanded = true;
        if let Some(reached_by) = local.nodes[node_ref.node].reached_by {
            let trans = &local.transitions[reached_by];
            let parent = &local.nodes[trans.source];
            let mut context = parent.context.clone();
            for assignment in trans.preconditions.iter().chain(&trans.side_effects) {
                context[assignment.local_var] = assignment.value;
            }
            let first_on_path = parent.reached_by.unwrap_or(reached_by);
            let node = &mut local.nodes[node_ref.node];
            node.context = context;
            node.reached_by = Some(first_on_path);
        }

        let node = self.node_mut(node_ref);
        let cost = node.cost;
        let waiting_list = std::mem::take(&mut node.waiting_list);
        for transition in waiting_list {
            let trans = self.transition_mut(transition);
            debug_assert!(trans.unreached_conditions > 0);
            trans.unreached_conditions -= 1;
            trans.target_cost = trans.target_cost.saturating_add(cost);
            self.try_to_fire(transition);
        }
    }

    fn expand_transition(&mut self, transition: TransitionRef, state: &[usize]) {
        let problem = transition.problem;
        let (source, target, action_cost) = {
            let trans = &self.problems[problem].transitions[transition.transition];
            (trans.source, trans.target, trans.action_cost)
        };
        let source_ref = NodeRef {
            problem,
            node: source,
        };
        let target_ref = NodeRef {
            problem,
            node: target,
        };
        let mut target_cost = self.node(source_ref).cost.saturating_add(action_cost);
        {
            let trans = self.transition_mut(transition);
            trans.target_cost = target_cost;
            trans.unreached_conditions = 0;
        }
        if self.node(target_ref).cost <= target_cost {
            return;
        }

        let num_preconditions = self.problems[problem].transitions[transition.transition]
            .preconditions
            .len();
        for i in 0..num_preconditions {
            let local = &self.problems[problem];
            let assignment = local.transitions[transition.transition].preconditions[i];
            let current = local.nodes[source].context[assignment.local_var];
            let var = local.context_variables[assignment.local_var];
            if current == assignment.value {
                continue;
            }
            let subproblem = self.local_problem(var, current);
            if self.problems[subproblem].base_priority.is_none() {
                let base_priority = self.priority(source_ref);
                self.set_up_local_problem(subproblem, base_priority, current, state);
            }
            let condition_ref = NodeRef {
                problem: subproblem,
                node: assignment.value,
            };
            let condition = self.node(condition_ref);
            if condition.expanded {
                target_cost = target_cost.saturating_add(condition.cost);
                self.transition_mut(transition).target_cost = target_cost;
                if self.node(target_ref).cost <= target_cost {
                    return;
                }
            } else {
                self.node_mut(condition_ref).waiting_list.push(transition);
                self.transition_mut(transition).unreached_conditions += 1;
            }
        }
        self.try_to_fire(transition);
    }

    fn compute_costs(&mut self, state: &[usize]) -> Cost {
        while !self.queue.is_empty() {
            let (priority, node_ref) = self.queue.pop();
            if (self.priority(node_ref) as usize) < priority {
                continue;
            }
            if node_ref == GOAL_NODE {
                return self.node(node_ref).cost;
            }
            self.expand_node(node_ref);
            for transition in self.node(node_ref).outgoing.clone() {
                self.expand_transition(
                    TransitionRef {
                        problem: node_ref.problem,
                        transition,
                    },
                    state,
                );
            }
        }
        INFINITE_COST
    }

    fn mark_helpful_transitions(&mut self, node_ref: NodeRef, state: &[usize]) {
        let Some(first_on_path) = self.node_mut(node_ref).reached_by.take() else {
            return;
        };
        let local = &self.problems[node_ref.problem];
        let trans = &local.transitions[first_on_path];
        if trans.target_cost == trans.action_cost {
            // Without zero-cost operators the cost test implies applicability.
            if let Some(op) = trans.op {
                if self.min_action_cost != 0 || self.task.operator(op).is_applicable(state) {
                    self.preferred.mark(op);
                }
            }
            return;
        }
        let conditions: Vec<(usize, usize)> = trans
            .preconditions
            .iter()
            .map(|assignment| (local.context_variables[assignment.local_var], assignment.value))
            .filter(|&(var, value)| state[var] != value)
            .collect();
        for (var, value) in conditions {
            let subproblem = self.local_problem(var, state[var]);
            self.mark_helpful_transitions(
                NodeRef {
                    problem: subproblem,
                    node: value,
                },
                state,
            );
        }
    }
}

/// A two-node problem whose only transition is conditioned on all goals.
fn goal_problem(task: &Task) -> LocalProblem {
    let mut problem = LocalProblem {
        base_priority: None,
        context_variables: task.goal.iter().map(|goal| goal.var).collect(),
        nodes: vec![LocalNode::new(), LocalNode::new()],
        transitions: vec![],
    };
    problem.add_transition(LocalTransition {
        source: 0,
        target: 1,
        op: None,
        preconditions: task
            .goal
            .iter()
            .enumerate()
            .map(|(local_var, goal)| LocalAssignment {
                local_var,
                value: goal.value,
            })
            .collect(),
        side_effects: vec![],
        action_cost: 0,
        target_cost: 0,
        unreached_conditions: 0,
    });
    problem
}

impl Heuristic for CeaHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        self.preferred.clear();
        self.queue.clear();
        for problem in &mut self.problems {
            problem.base_priority = None;
        }
        let values = state.values();
        self.set_up_local_problem(GOAL_PROBLEM, 0, 0, values);
        let h = self.compute_costs(values);
        if h != INFINITE_COST && h != 0 {
            self.mark_helpful_transitions(GOAL_NODE, values);
        }
        HeuristicValue::from_cost(h)
    }

    fn dead_ends_are_reliable(&self) -> bool {
        false
    }

    fn preferred_operators(&self) -> &[OperatorId] {
        self.preferred.as_slice()
    }
}
