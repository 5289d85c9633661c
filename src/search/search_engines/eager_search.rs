//! Best-first search that evaluates states when they are generated. With an
//! f-ordered open list and reopening of closed states this is A*.

use crate::search::{
    open_lists::{EvaluationContext, OpenList},
    search_engines::{
        DeadEndStatus, Evaluators, SearchEngine, SearchOptions, SearchSpace, SearchStatistics,
        SearchStatus,
    },
    states::{State, StateId, StateRegistry},
    successor_generators::SuccessorGenerator,
    OperatorId, PlannerError, Plan, Result, Task,
};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct EagerSearch {
    task: Rc<Task>,
    registry: StateRegistry,
    successor_generator: SuccessorGenerator,
    evaluators: Evaluators,
    open_list: Box<dyn OpenList<StateId>>,
    search_space: SearchSpace,
    statistics: SearchStatistics,
    options: SearchOptions,
    status: SearchStatus,
    plan: Option<Plan>,
    applicable: Vec<OperatorId>,
    pruned_unsafely: bool,
}

impl EagerSearch {
    pub fn new(
        task: Rc<Task>,
        evaluators: Evaluators,
        open_list: Box<dyn OpenList<StateId>>,
        options: SearchOptions,
    ) -> Result<Self> {
        if options.bound < 0 {
            return Err(PlannerError::InvalidConfig(format!(
                "negative cost bound {}",
                options.bound
            )));
        }
        Ok(Self {
            registry: StateRegistry::new(task.clone())?,
            successor_generator: SuccessorGenerator::new(&task),
            statistics: SearchStatistics::new(evaluators.len()),
            evaluators,
            open_list,
            search_space: SearchSpace::new(),
            options,
            status: SearchStatus::Ready,
            plan: None,
            applicable: vec![],
            pruned_unsafely: false,
            task,
        })
    }

    fn record_dead_end(&mut self, state: &State, dead_end: DeadEndStatus) {
        debug!(state = %state.id(), ?dead_end, "pruned dead end");
        self.search_space.mark_as_dead_end(state);
        self.statistics.increment_dead_end_states();
        if dead_end.is_unreliable() {
            self.pruned_unsafely = true;
        }
    }

    fn initialize(&mut self) -> SearchStatus {
        info!("conducting best-first search with eager evaluation");
        let initial_state = self.registry.initial_state();
        self.evaluators.notify_initial_state(&initial_state);
        let dead_end = self.evaluators.evaluate(&initial_state);
        self.statistics.increment_evaluated_states();
        if dead_end.is_dead_end() {
            info!("initial state is a dead end");
            self.record_dead_end(&initial_state, dead_end);
            return SearchStatus::Failed;
        }
        self.statistics
            .report_heuristic_values(self.evaluators.h_values());
        self.search_space.open_initial(&initial_state);
        let context = EvaluationContext::new(0, self.evaluators.h_values(), false);
        self.open_list.insert(&context, initial_state.id());
        SearchStatus::InProgress
    }

    /// Removes entries until one refers to a state that is still open.
    fn fetch_next_node(&mut self) -> Option<State> {
        while !self.open_list.is_empty() {
            let id = self.open_list.remove_min();
            if self.search_space.node_by_id(id).is_open() {
                let state = self.registry.lookup_state(id);
                self.search_space.close(&state);
                return Some(state);
            }
        }
        None
    }

    fn expand(&mut self, state: &State) {
        let node = self.search_space.node(state);
        self.applicable.clear();
        self.successor_generator
            .generate_applicable_ops(state.values(), &mut self.applicable);
        self.statistics
            .increment_generated_operators(self.applicable.len());

        // The heuristics' preferred operators belong to the state they
        // evaluated last, so the expanded state is evaluated again.
        if self.evaluators.uses_preferred_operators() {
            self.evaluators.evaluate(state);
        }
        let preferred = self.evaluators.preferred_operators().clone();

        let applicable = std::mem::take(&mut self.applicable);
        for &op in &applicable {
            let real_g = node.real_g.saturating_add(self.task.operator(op).cost);
            if real_g >= self.options.bound {
                self.pruned_unsafely = true;
                continue;
            }
            let g = node
                .g
                .saturating_add(self.task.adjusted_cost(op, self.options.cost_type));
            let successor = self.registry.successor_state(state, op);
            self.statistics.increment_generated_states();
            self.evaluators
                .notify_state_transition(state, op, &successor);

            let successor_node = self.search_space.node(&successor);
            if successor_node.is_dead_end() {
                continue;
            }
            if successor_node.is_new() {
                let dead_end = self.evaluators.evaluate(&successor);
                self.statistics.increment_evaluated_states();
                if dead_end.is_dead_end() {
                    self.record_dead_end(&successor, dead_end);
                    continue;
                }
                self.search_space
                    .open(&successor, state.id(), op, g, real_g);
                let context =
                    EvaluationContext::new(g, self.evaluators.h_values(), preferred.contains(op));
                self.open_list.insert(&context, successor.id());
                if self
                    .statistics
                    .report_heuristic_values(self.evaluators.h_values())
                {
                    self.open_list.boost_preferred();
                }
            } else if g < successor_node.g {
                if successor_node.is_closed() && !self.options.reopen_closed {
                    // Keeps the traced plan consistent with the best g.
                    self.search_space
                        .update_parent(&successor, state.id(), op, g, real_g);
                    continue;
                }
                // Path dependent heuristics may find a dead end on the new path.
                let dead_end = self.evaluators.evaluate(&successor);
                self.statistics.increment_evaluated_states();
                if dead_end.is_dead_end() {
                    self.record_dead_end(&successor, dead_end);
                    continue;
                }
                if successor_node.is_closed() {
                    self.statistics.increment_reopened_states();
                }
                self.search_space
                    .open(&successor, state.id(), op, g, real_g);
                let context =
                    EvaluationContext::new(g, self.evaluators.h_values(), preferred.contains(op));
                self.open_list.insert(&context, successor.id());
            }
        }
        self.applicable = applicable;
    }
}

impl SearchEngine for EagerSearch {
    fn step(&mut self) -> SearchStatus {
        match self.status {
            SearchStatus::Ready => {
                self.status = self.initialize();
                return self.status;
            }
            SearchStatus::InProgress => {}
            SearchStatus::Solved | SearchStatus::Failed => return self.status,
        }

        let Some(state) = self.fetch_next_node() else {
            info!("completely explored state space, no solution");
            self.status = SearchStatus::Failed;
            return self.status;
        };
        if self.task.is_goal(state.values()) {
            let plan = self.search_space.trace_path(&state);
            info!(
                plan_length = plan.len(),
                plan_cost = plan.cost(&self.task),
                "solution found"
            );
            self.plan = Some(plan);
            self.status = SearchStatus::Solved;
            return self.status;
        }
        self.expand(&state);
        self.statistics.increment_expanded_states();
        self.status
    }

    fn status(&self) -> SearchStatus {
        self.status
    }

    fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    fn failure_is_proof(&self) -> bool {
        !self.pruned_unsafely
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::{
            landmarks::LandmarkCountHeuristic, pdbs::PdbHeuristic, BlindHeuristic, CeaHeuristic,
            Heuristic, HeuristicValue, HmHeuristic,
        },
        search_engines::{astar_open_list, greedy_open_list, SearchResult, TerminationCondition},
        OperatorCost,
    };
    use crate::test_utils::*;

    fn astar(task: &Rc<Task>, heuristic: Box<dyn Heuristic>) -> EagerSearch {
        let evaluators = Evaluators::new(task, vec![heuristic], vec![]).unwrap();
        let options = SearchOptions {
            reopen_closed: true,
            ..SearchOptions::default()
        };
        EagerSearch::new(task.clone(), evaluators, astar_open_list(1), options).unwrap()
    }

    fn solve(search: &mut EagerSearch) -> Plan {
        match search.search(&mut TerminationCondition::unlimited()) {
            SearchResult::Success(plan) => plan,
            result => panic!("no plan found: {:?}", result),
        }
    }

    #[test]
    fn astar_finds_optimal_plans() {
        for text in [TRUCK_SAS_TEXT, GRID_SAS_TEXT, BLOCKS_SAS_TEXT, DEAD_END_SAS_TEXT] {
            let task = Rc::new(Task::from_text(text).unwrap());
            let optimal = goal_distances(&task, OperatorCost::Normal)[&task.initial_state];
            let heuristic = HmHeuristic::new(task.clone(), 2, OperatorCost::Normal).unwrap();
            let mut search = astar(&task, Box::new(heuristic));
            let plan = solve(&mut search);
            assert!(task.is_goal(&plan.execute(&task).unwrap()));
            assert_eq!(plan.cost(&task), optimal);
        }
    }

    #[test]
    fn pdb_astar_is_optimal_on_blocks() {
        let task = Rc::new(Task::from_text(BLOCKS_SAS_TEXT).unwrap());
        let optimal = goal_distances(&task, OperatorCost::Normal)[&task.initial_state];
        let heuristic = PdbHeuristic::new(task.clone(), &[0, 1, 2], OperatorCost::Normal).unwrap();
        let mut search = astar(&task, Box::new(heuristic));
        let plan = solve(&mut search);
        assert!(task.is_goal(&plan.execute(&task).unwrap()));
        assert_eq!(plan.cost(&task), optimal);
        assert!(search.statistics().expanded_states() <= reachable_states(&task).len());
    }

    /// Reports a reliable dead end for states reached by the shortcut
    /// `go a t`, and 0 otherwise.
    #[derive(Debug, Default)]
    struct ShortcutTrap {
        last_op: Option<OperatorId>,
    }

    impl Heuristic for ShortcutTrap {
        fn evaluate(&mut self, _state: &State) -> HeuristicValue {
            if self.last_op == Some(OperatorId(2)) {
                HeuristicValue::DeadEnd
            } else {
                HeuristicValue::Estimate(0)
            }
        }

        fn dead_ends_are_reliable(&self) -> bool {
            true
        }

        fn notify_state_transition(&mut self, _parent: &State, op: OperatorId, _state: &State) {
            self.last_op = Some(op);
        }
    }

    const DETOUR_SAS_TEXT: &str = "begin_version
3
end_version
begin_metric
1
end_metric
1
begin_variable
var0
-1
3
Atom at(s)
Atom at(a)
Atom at(t)
end_variable
0
begin_state
0
end_state
begin_goal
1
0 2
end_goal
3
begin_operator
go s a
0
1
0 0 0 1
1
end_operator
begin_operator
go s t
0
1
0 0 0 2
5
end_operator
begin_operator
go a t
0
1
0 0 1 2
1
end_operator
0
";

    #[test]
    fn cheaper_path_to_dead_end_is_not_reopened() {
        let task = Rc::new(Task::from_text(DETOUR_SAS_TEXT).unwrap());
        let mut search = astar(&task, Box::new(ShortcutTrap::default()));
        // t is opened by `go s t`, then reached more cheaply through a.
        assert_eq!(
            search.search(&mut TerminationCondition::unlimited()),
            SearchResult::ProvablyUnsolvable
        );
        assert_eq!(search.statistics().dead_end_states(), 1);
        assert_eq!(search.statistics().expanded_states(), 2);
    }

    #[test]
    fn blind_astar_expands_few_states_on_blocks() {
        let task = Rc::new(Task::from_text(BLOCKS_SAS_TEXT).unwrap());
        let heuristic = BlindHeuristic::new(task.clone(), OperatorCost::Normal);
        let mut search = astar(&task, Box::new(heuristic));
        let plan = solve(&mut search);
        assert_eq!(plan.len(), 2);
        assert!(search.statistics().expanded_states() <= reachable_states(&task).len());
    }

    #[test]
    fn eager_greedy_with_preferred_operators() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(CeaHeuristic::new(task.clone(), OperatorCost::Normal)),
            Box::new(LandmarkCountHeuristic::new(task.clone(), OperatorCost::Normal)),
        ];
        let evaluators = Evaluators::new(&task, heuristics, vec![0, 1]).unwrap();
        let open_list = greedy_open_list(&evaluators, 1000);
        let mut search =
            EagerSearch::new(task.clone(), evaluators, open_list, SearchOptions::default())
                .unwrap();
        let plan = solve(&mut search);
        assert!(task.is_goal(&plan.execute(&task).unwrap()));
        assert_eq!(search.status(), SearchStatus::Solved);
    }

    #[test]
    fn dead_end_initial_state() {
        let task = Rc::new(Task::from_text(UNSOLVABLE_SAS_TEXT).unwrap());
        let heuristic = HmHeuristic::new(task.clone(), 1, OperatorCost::Normal).unwrap();
        let mut search = astar(&task, Box::new(heuristic));
        assert_eq!(
            search.search(&mut TerminationCondition::unlimited()),
            SearchResult::ProvablyUnsolvable
        );
        assert_eq!(search.statistics().expanded_states(), 0);
        assert_eq!(search.statistics().dead_end_states(), 1);
    }

    #[test]
    fn expansion_limit() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let heuristic = BlindHeuristic::new(task.clone(), OperatorCost::Normal);
        let mut search = astar(&task, Box::new(heuristic));
        let mut termination = TerminationCondition::new(None, None, Some(3));
        assert_eq!(
            search.search(&mut termination),
            SearchResult::ExpansionLimitExceeded
        );
        assert_eq!(search.statistics().expanded_states(), 3);
    }

    #[test]
    fn negative_bound_is_rejected() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        let heuristics: Vec<Box<dyn Heuristic>> =
            vec![Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal))];
        let evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        let options = SearchOptions {
            bound: -1,
            ..SearchOptions::default()
        };
        assert!(matches!(
            EagerSearch::new(task, evaluators, astar_open_list(1), options),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
