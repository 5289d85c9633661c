//! Best-first search with deferred evaluation. The open lists hold
//! (parent, operator) pairs keyed by the parent's heuristic values, and a
//! successor state is only generated and evaluated once its entry is
//! removed.

use crate::search::{
    open_lists::{EvaluationContext, OpenList},
    search_engines::{
        Evaluators, SearchEngine, SearchOptions, SearchSpace, SearchStatistics, SearchStatus,
    },
    states::{State, StateId, StateRegistry, NO_STATE},
    successor_generators::SuccessorGenerator,
    Cost, OperatorId, PlannerError, Plan, Result, Task,
};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct BestFirstSearch {
    task: Rc<Task>,
    registry: StateRegistry,
    successor_generator: SuccessorGenerator,
    evaluators: Evaluators,
    open_list: Box<dyn OpenList<(StateId, OperatorId)>>,
    search_space: SearchSpace,
    statistics: SearchStatistics,
    options: SearchOptions,
    status: SearchStatus,
    plan: Option<Plan>,
    /// The state the next step considers and how it was reached.
    current_state: State,
    current_parent: StateId,
    current_operator: Option<OperatorId>,
    current_g: Cost,
    current_real_g: Cost,
    applicable: Vec<OperatorId>,
    /// Some state was pruned by heuristics whose dead ends are unreliable,
    /// or by the cost bound.
    pruned_unsafely: bool,
}

impl BestFirstSearch {
    pub fn new(
        task: Rc<Task>,
        evaluators: Evaluators,
        open_list: Box<dyn OpenList<(StateId, OperatorId)>>,
        options: SearchOptions,
    ) -> Result<Self> {
        if options.bound < 0 {
            return Err(PlannerError::InvalidConfig(format!(
                "negative cost bound {}",
                options.bound
            )));
        }
        let mut registry = StateRegistry::new(task.clone())?;
        let initial_state = registry.initial_state();
        let statistics = SearchStatistics::new(evaluators.len());
        Ok(Self {
            successor_generator: SuccessorGenerator::new(&task),
            registry,
            evaluators,
            open_list,
            search_space: SearchSpace::new(),
            statistics,
            options,
            status: SearchStatus::Ready,
            plan: None,
            current_state: initial_state,
            current_parent: NO_STATE,
            current_operator: None,
            current_g: 0,
            current_real_g: 0,
            applicable: vec![],
            pruned_unsafely: false,
            task,
        })
    }

    /// Whether the current state is a goal. A zero estimate from any
    /// heuristic gates the full goal test, which always decides.
    fn check_goal(&self) -> bool {
        self.evaluators.any_is_zero() && self.task.is_goal(self.current_state.values())
    }

    fn generate_successors(&mut self) {
        self.applicable.clear();
        self.successor_generator
            .generate_applicable_ops(self.current_state.values(), &mut self.applicable);
        self.statistics
            .increment_generated_operators(self.applicable.len());

        let preferred = self.evaluators.preferred_operators().clone();
        let h_values = self.evaluators.h_values();
        for &op in &self.applicable {
            let real_g = self
                .current_real_g
                .saturating_add(self.task.operator(op).cost);
            if real_g >= self.options.bound {
                self.pruned_unsafely = true;
                continue;
            }
            let g = self
                .current_g
                .saturating_add(self.task.adjusted_cost(op, self.options.cost_type));
            let context = EvaluationContext::new(g, h_values, preferred.contains(op));
            self.open_list
                .insert(&context, (self.current_state.id(), op));
        }
    }

    /// Removes the next entry from the open list and generates its state.
    fn fetch_next_state(&mut self) -> SearchStatus {
        if self.open_list.is_empty() {
            info!("completely explored state space, no solution");
            self.status = SearchStatus::Failed;
            return self.status;
        }
        let (parent_id, op) = self.open_list.remove_min();
        let parent = self.registry.lookup_state(parent_id);
        let parent_node = self.search_space.node_by_id(parent_id);
        self.current_g = parent_node
            .g
            .saturating_add(self.task.adjusted_cost(op, self.options.cost_type));
        self.current_real_g = parent_node
            .real_g
            .saturating_add(self.task.operator(op).cost);
        self.current_state = self.registry.successor_state(&parent, op);
        self.current_parent = parent_id;
        self.current_operator = Some(op);
        self.statistics.increment_generated_states();
        SearchStatus::InProgress
    }
}

impl SearchEngine for BestFirstSearch {
    fn step(&mut self) -> SearchStatus {
        match self.status {
            SearchStatus::Ready => {
                info!("conducting best-first search with deferred evaluation");
                self.evaluators.notify_initial_state(&self.current_state);
                self.status = SearchStatus::InProgress;
            }
            SearchStatus::InProgress => {}
            SearchStatus::Solved | SearchStatus::Failed => return self.status,
        }

        let node = self.search_space.node(&self.current_state);
        if node.is_new() {
            match self.current_operator {
                Some(op) => {
                    self.search_space.open(
                        &self.current_state,
                        self.current_parent,
                        op,
                        self.current_g,
                        self.current_real_g,
                    );
                    let parent = self.registry.lookup_state(self.current_parent);
                    self.evaluators
                        .notify_state_transition(&parent, op, &self.current_state);
                }
                None => self.search_space.open_initial(&self.current_state),
            }
            self.search_space.close(&self.current_state);

            let dead_end = self.evaluators.evaluate(&self.current_state);
            self.statistics.increment_evaluated_states();
            if dead_end.is_dead_end() {
                debug!(state = %self.current_state.id(), ?dead_end, "pruned dead end");
                self.search_space.mark_as_dead_end(&self.current_state);
                self.statistics.increment_dead_end_states();
                if dead_end.is_unreliable() {
                    self.pruned_unsafely = true;
                }
            } else {
                if self
                    .statistics
                    .report_heuristic_values(self.evaluators.h_values())
                {
                    self.open_list.boost_preferred();
                }
                if self.check_goal() {
                    let plan = self.search_space.trace_path(&self.current_state);
                    info!(
                        plan_length = plan.len(),
                        plan_cost = plan.cost(&self.task),
                        "solution found"
                    );
                    self.plan = Some(plan);
                    self.status = SearchStatus::Solved;
                    return self.status;
                }
                self.generate_successors();
                self.statistics.increment_expanded_states();
            }
        }
        self.fetch_next_state()
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
            pdbs::PdbHeuristic, BlindHeuristic, CgHeuristic, GoalCountHeuristic, Heuristic,
            HmHeuristic,
        },
        open_lists::{BucketOpenList, KeyEvaluator},
        search_engines::{greedy_open_list, SearchResult, TerminationCondition},
        OperatorCost, INFINITE_COST,
    };
    use crate::test_utils::*;

    fn lazy_search(
        task: &Rc<Task>,
        heuristics: Vec<Box<dyn Heuristic>>,
        preferred: Vec<usize>,
    ) -> BestFirstSearch {
        let evaluators = Evaluators::new(task, heuristics, preferred).unwrap();
        let open_list = greedy_open_list(&evaluators, 1000);
        BestFirstSearch::new(task.clone(), evaluators, open_list, SearchOptions::default())
            .unwrap()
    }

    #[test]
    fn blocks_with_pattern_database() {
        let task = Rc::new(Task::from_text(BLOCKS_SAS_TEXT).unwrap());
        let pdb = PdbHeuristic::new(task.clone(), &[0, 1, 2], OperatorCost::Normal).unwrap();
        let mut search = lazy_search(&task, vec![Box::new(pdb)], vec![]);
        assert_eq!(search.status(), SearchStatus::Ready);

        let result = search.search(&mut TerminationCondition::unlimited());
        let SearchResult::Success(plan) = result else {
            panic!("no plan found: {:?}", result);
        };
        assert_eq!(plan.cost(&task), 2);
        assert!(task.is_goal(&plan.execute(&task).unwrap()));
        assert_eq!(search.status(), SearchStatus::Solved);
        assert!(search.statistics().expanded_states() <= reachable_states(&task).len());
        // Terminal states stay terminal.
        assert_eq!(search.step(), SearchStatus::Solved);
    }

    #[test]
    fn goal_found_when_only_a_later_heuristic_is_zero() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(ConstantHeuristic(5)),
            Box::new(GoalCountHeuristic::new(task.clone())),
        ];
        let mut search = lazy_search(&task, heuristics, vec![]);
        let result = search.search(&mut TerminationCondition::unlimited());
        let SearchResult::Success(plan) = result else {
            panic!("no plan found: {:?}", result);
        };
        assert!(task.is_goal(&plan.execute(&task).unwrap()));
    }

    #[test]
    fn truck_with_preferred_operators() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let cg = CgHeuristic::new(task.clone(), OperatorCost::Normal, 1_000_000);
        let mut search = lazy_search(&task, vec![Box::new(cg)], vec![0]);
        let result = search.search(&mut TerminationCondition::unlimited());
        let SearchResult::Success(plan) = result else {
            panic!("no plan found: {:?}", result);
        };
        assert!(task.is_goal(&plan.execute(&task).unwrap()));
    }

    #[test]
    fn reliable_dead_end_is_pruned() {
        let task = Rc::new(Task::from_text(DEAD_END_SAS_TEXT).unwrap());
        let heuristics: Vec<Box<dyn Heuristic>> = vec![
            Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal)),
            Box::new(HmHeuristic::new(task.clone(), 1, OperatorCost::Normal).unwrap()),
        ];
        let mut search = lazy_search(&task, heuristics, vec![]);
        let result = search.search(&mut TerminationCondition::unlimited());
        let SearchResult::Success(plan) = result else {
            panic!("no plan found: {:?}", result);
        };
        assert_eq!(plan.steps(), &[OperatorId(1), OperatorId(2)]);
        assert_eq!(search.statistics().dead_end_states(), 1);
    }

    #[test]
    fn exhausted_search_proves_unsolvability() {
        let task = Rc::new(Task::from_text(UNSOLVABLE_SAS_TEXT).unwrap());
        let heuristic = BlindHeuristic::new(task.clone(), OperatorCost::Normal);
        let mut search = lazy_search(&task, vec![Box::new(heuristic)], vec![]);
        assert_eq!(
            search.search(&mut TerminationCondition::unlimited()),
            SearchResult::ProvablyUnsolvable
        );
        assert_eq!(search.status(), SearchStatus::Failed);
        assert_eq!(search.statistics().expanded_states(), 2);
    }

    #[test]
    fn unreliable_pruning_makes_failure_incomplete() {
        let task = Rc::new(Task::from_text(UNSOLVABLE_SAS_TEXT).unwrap());
        let heuristic = CgHeuristic::new(task.clone(), OperatorCost::Normal, 0);
        let mut search = lazy_search(&task, vec![Box::new(heuristic)], vec![]);
        assert_eq!(
            search.search(&mut TerminationCondition::unlimited()),
            SearchResult::IncompleteUnsolvable
        );
    }

    #[test]
    fn cost_bound_prunes_plans() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        let evaluators = Evaluators::new(
            &task,
            vec![Box::new(GoalCountHeuristic::new(task.clone()))],
            vec![],
        )
        .unwrap();
        let options = SearchOptions {
            bound: 4,
            ..SearchOptions::default()
        };
        let open_list = Box::new(BucketOpenList::new(KeyEvaluator::H(0), false));
        let mut search = BestFirstSearch::new(task.clone(), evaluators, open_list, options).unwrap();
        assert_eq!(
            search.search(&mut TerminationCondition::unlimited()),
            SearchResult::IncompleteUnsolvable
        );

        let evaluators = Evaluators::new(
            &task,
            vec![Box::new(GoalCountHeuristic::new(task.clone()))],
            vec![],
        )
        .unwrap();
        let options = SearchOptions {
            bound: INFINITE_COST,
            ..SearchOptions::default()
        };
        let open_list = Box::new(BucketOpenList::new(KeyEvaluator::H(0), false));
        let mut search = BestFirstSearch::new(task.clone(), evaluators, open_list, options).unwrap();
        let SearchResult::Success(plan) = search.search(&mut TerminationCondition::unlimited())
        else {
            panic!("grid is solvable");
        };
        assert_eq!(plan.cost(&task), 4);
    }

    #[test]
    fn expansion_limit() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let heuristic = BlindHeuristic::new(task.clone(), OperatorCost::Normal);
        let mut search = lazy_search(&task, vec![Box::new(heuristic)], vec![]);
        let mut termination = TerminationCondition::new(None, None, Some(2));
        assert_eq!(
            search.search(&mut termination),
            SearchResult::ExpansionLimitExceeded
        );
        assert_eq!(search.statistics().expanded_states(), 2);
        assert_eq!(search.status(), SearchStatus::InProgress);
    }

    #[test]
    fn negative_bound_is_rejected() {
        let task = Rc::new(Task::from_text(GRID_SAS_TEXT).unwrap());
        let heuristics: Vec<Box<dyn Heuristic>> =
            vec![Box::new(BlindHeuristic::new(task.clone(), OperatorCost::Normal))];
        let evaluators = Evaluators::new(&task, heuristics, vec![]).unwrap();
        let open_list = greedy_open_list(&evaluators, 1000);
        let options = SearchOptions {
            bound: -1,
            ..SearchOptions::default()
        };
        assert!(matches!(
            BestFirstSearch::new(task, evaluators, open_list, options),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
