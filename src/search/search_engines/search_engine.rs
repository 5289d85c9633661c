use crate::search::{
    config::PlannerConfig,
    heuristics::Heuristic,
    open_lists::{AlternationOpenList, BucketOpenList, KeyEvaluator, OpenList, TieBreakingOpenList},
    search_engines::{
        BestFirstSearch, EagerSearch, Evaluators, SearchStatistics, TerminationCondition,
    },
    Cost, OperatorCost, Plan, Result, Task, INFINITE_COST,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, rc::Rc};
use strum_macros::EnumIs;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// The search was successful
    Success(Plan),
    /// The whole reachable state space was explored without finding a goal
    ProvablyUnsolvable,
    /// No goal was found, but the search pruned states that may lead to one
    IncompleteUnsolvable,
    /// The search engine ran out of time
    TimeLimitExceeded,
    /// The search engine ran out of memory
    MemoryLimitExceeded,
    /// The search engine expanded as many states as it was allowed to
    ExpansionLimitExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum SearchStatus {
    /// No step was taken yet
    Ready,
    InProgress,
    Solved,
    Failed,
}

impl SearchStatus {
    pub fn is_terminal(&self) -> bool {
        self.is_solved() || self.is_failed()
    }
}

/// Parameters shared by all search engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub cost_type: OperatorCost,
    /// Only paths whose real cost is below the bound are considered.
    pub bound: Cost,
    pub reopen_closed: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            cost_type: OperatorCost::Normal,
            bound: INFINITE_COST,
            reopen_closed: false,
        }
    }
}

pub trait SearchEngine: Debug {
    /// Performs one step of the search. Stepping a search that is solved or
    /// failed has no effect.
    fn step(&mut self) -> SearchStatus;

    fn status(&self) -> SearchStatus;

    /// The plan, once the search is solved.
    fn plan(&self) -> Option<&Plan>;

    fn statistics(&self) -> &SearchStatistics;

    /// Whether a failed search proves that the task has no solution.
    fn failure_is_proof(&self) -> bool;

    /// Steps until the search is solved, fails, or exceeds a limit.
    fn search(&mut self, termination: &mut TerminationCondition) -> SearchResult {
        let result = loop {
            if let Some(result) = termination.should_terminate(self.statistics().expanded_states())
            {
                info!(?result, "search terminated");
                break result;
            }
            match self.step() {
                SearchStatus::Ready | SearchStatus::InProgress => termination.log_if_needed(),
                SearchStatus::Solved => match self.plan() {
                    Some(plan) => break SearchResult::Success(plan.clone()),
                    None => unreachable!("solved search without a plan"),
                },
                SearchStatus::Failed if self.failure_is_proof() => {
                    break SearchResult::ProvablyUnsolvable
                }
                SearchStatus::Failed => break SearchResult::IncompleteUnsolvable,
            }
        };
        self.statistics().finalise_search();
        termination.finalise();
        result
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SearchEngineName {
    #[default]
    #[clap(help = "Greedy best-first search with deferred evaluation.")]
    LazyGreedy,
    #[clap(help = "Greedy best-first search evaluating states when generated.")]
    EagerGreedy,
    #[clap(help = "A* search, weighted if the configured weight exceeds 1.")]
    Astar,
}

impl SearchEngineName {
    pub fn create(&self, task: Rc<Task>, config: &PlannerConfig) -> Result<Box<dyn SearchEngine>> {
        let heuristics = config
            .heuristics
            .iter()
            .map(|heuristic| heuristic.create(task.clone()))
            .collect::<Result<Vec<Box<dyn Heuristic>>>>()?;
        let evaluators = Evaluators::new(&task, heuristics, config.preferred.clone())?;
        let mut options = SearchOptions {
            cost_type: config.cost_type,
            bound: config.bound.unwrap_or(INFINITE_COST),
            reopen_closed: config.reopen_closed.unwrap_or(false),
        };
        info!(engine = ?self, num_heuristics = evaluators.len(), ?options);

        Ok(match self {
            SearchEngineName::LazyGreedy => {
                let open_list = greedy_open_list(&evaluators, config.boost);
                Box::new(BestFirstSearch::new(task, evaluators, open_list, options)?)
            }
            SearchEngineName::EagerGreedy => {
                let open_list = greedy_open_list(&evaluators, config.boost);
                Box::new(EagerSearch::new(task, evaluators, open_list, options)?)
            }
            SearchEngineName::Astar => {
                options.reopen_closed = config.reopen_closed.unwrap_or(true);
                let open_list = astar_open_list(config.weight);
                Box::new(EagerSearch::new(task, evaluators, open_list, options)?)
            }
        })
    }
}

/// One list per heuristic ordered by its value, plus a preferred-only list
/// per heuristic if preferred operators are used.
pub fn greedy_open_list<E: Copy + Debug + 'static>(
    evaluators: &Evaluators,
    boost: i32,
) -> Box<dyn OpenList<E>> {
    let use_preferred = evaluators.uses_preferred_operators();
    if evaluators.len() == 1 && !use_preferred {
        return Box::new(BucketOpenList::new(KeyEvaluator::H(0), false));
    }
    let mut sublists: Vec<Box<dyn OpenList<E>>> = vec![];
    for index in 0..evaluators.len() {
        sublists.push(Box::new(BucketOpenList::new(KeyEvaluator::H(index), false)));
        if use_preferred {
            sublists.push(Box::new(BucketOpenList::new(KeyEvaluator::H(index), true)));
        }
    }
    Box::new(AlternationOpenList::new(sublists, boost))
}

/// Orders by `g + weight * h` of the first heuristic, breaking ties by `h`.
pub fn astar_open_list<E: Debug + 'static>(weight: Cost) -> Box<dyn OpenList<E>> {
    let h = if weight == 1 {
        KeyEvaluator::H(0)
    } else {
        KeyEvaluator::Weighted(Box::new(KeyEvaluator::H(0)), weight)
    };
    Box::new(TieBreakingOpenList::new(
        vec![KeyEvaluator::Sum(vec![KeyEvaluator::G, h]), KeyEvaluator::H(0)],
        false,
    ))
}
