//! Pattern collection generation by hill climbing in the space of pattern
//! collections (Haslum et al., AAAI 2007). Starting from one singleton
//! pattern per goal variable, every iteration adds the candidate pattern
//! that improves the canonical heuristic on the most sampled states.

use crate::search::{
    heuristics::pdbs::{
        goal_variable_patterns, CanonicalPdbs, Pattern, PatternDatabase, RandomWalkSampler,
    },
    CausalGraph, Cost, OperatorCost, PlannerError, Result, Task, INFINITE_COST,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HillClimbingConfig {
    /// Maximal number of abstract states of a candidate PDB.
    pub pdb_max_size: usize,
    /// Maximal number of abstract states of the whole collection.
    pub collection_max_size: usize,
    /// Number of sampled states each candidate is evaluated on.
    pub num_samples: usize,
    /// Minimal number of improved samples for a candidate to be added.
    pub min_improvement: usize,
    #[serde(
        with = "crate::search::config::optional_duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_time: Option<Duration>,
    /// Seeds the sampling; `None` seeds from the operating system.
    pub random_seed: Option<u64>,
}

impl Default for HillClimbingConfig {
    fn default() -> Self {
        Self {
            pdb_max_size: 2_000_000,
            collection_max_size: 20_000_000,
            num_samples: 1000,
            min_improvement: 10,
            max_time: None,
            random_seed: None,
        }
    }
}

/// Raised when hill climbing runs out of time. The collection built so far
/// is kept.
#[derive(Debug)]
struct Timeout;

#[derive(Debug)]
pub struct PatternCollectionHillClimbing {
    config: HillClimbingConfig,
    rng: StdRng,
    start_time: Instant,
    num_rejected: usize,
}

impl PatternCollectionHillClimbing {
    pub fn new(config: HillClimbingConfig) -> Result<Self> {
        if config.num_samples == 0 || config.min_improvement == 0 || config.pdb_max_size == 0 {
            return Err(PlannerError::InvalidConfig(
                "hill climbing sizes and sample counts must be positive".to_string(),
            ));
        }
        if config.min_improvement > config.num_samples {
            return Err(PlannerError::InvalidConfig(format!(
                "minimum improvement {} exceeds the number of samples {}",
                config.min_improvement, config.num_samples
            )));
        }
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            start_time: Instant::now(),
            num_rejected: 0,
        })
    }

    fn check_time(&self) -> std::result::Result<(), Timeout> {
        match self.config.max_time {
            Some(max_time) if self.start_time.elapsed() >= max_time => Err(Timeout),
            _ => Ok(()),
        }
    }

    /// Runs hill climbing and returns the resulting collection. The goal
    /// variable singletons are always part of it, even if they exceed the
    /// size limits.
    pub fn generate(&mut self, task: &Task, cost_type: OperatorCost) -> Result<CanonicalPdbs> {
        self.start_time = Instant::now();
        let pdbs = goal_variable_patterns(task)
            .into_iter()
            .map(|pattern| PatternDatabase::new(task, pattern, cost_type, None).map(Rc::new))
            .collect::<Result<Vec<_>>>()?;
        let mut current = CanonicalPdbs::new(task, pdbs);
        if current.is_dead_end(&task.initial_state) {
            info!("initial state is a dead end, no hill climbing");
            return Ok(current);
        }
        if self.config.max_time == Some(Duration::ZERO) {
            return Ok(current);
        }
        match self.hill_climbing(task, cost_type, &mut current)? {
            Ok(num_iterations) => info!(num_iterations, "hill climbing finished"),
            Err(Timeout) => info!("time limit reached, hill climbing aborted"),
        }
        info!(
            num_rejected = self.num_rejected,
            num_patterns = current.pdbs().len(),
            collection_size = current.size(),
            time = self.start_time.elapsed().as_secs_f64()
        );
        Ok(current)
    }

    fn hill_climbing(
        &mut self,
        task: &Task,
        cost_type: OperatorCost,
        current: &mut CanonicalPdbs,
    ) -> Result<std::result::Result<usize, Timeout>> {
        let relevant_neighbours = compute_relevant_neighbours(task);
        let sampler = RandomWalkSampler::new(task, cost_type);
        info!(average_operator_cost = sampler.average_operator_cost());

        let mut generated_patterns = BTreeSet::new();
        let mut candidates: Vec<Option<Rc<PatternDatabase>>> = vec![];
        for pdb in current.pdbs().to_vec() {
            if let Err(Timeout) = self.generate_candidates(
                task,
                cost_type,
                &relevant_neighbours,
                &pdb,
                &mut generated_patterns,
                &mut candidates,
            )? {
                return Ok(Err(Timeout));
            }
        }

        let mut num_iterations = 0;
        loop {
            num_iterations += 1;
            let init_h = current.value(&task.initial_state);
            debug!(init_h, collection_size = current.size());
            if init_h == INFINITE_COST {
                info!("initial state is a dead end, hill climbing stops");
                return Ok(Ok(num_iterations));
            }

            let mut samples = Vec::with_capacity(self.config.num_samples);
            for _ in 0..self.config.num_samples {
                samples.push(sampler.sample_state(&mut self.rng, init_h, |values| {
                    current.is_dead_end(values)
                }));
                if let Err(Timeout) = self.check_time() {
                    return Ok(Err(Timeout));
                }
            }
            let samples_h: Vec<Cost> = samples.iter().map(|values| current.value(values)).collect();

            let (improvement, best) =
                match self.find_best_improving_pdb(current, &samples, &samples_h, &mut candidates) {
                    Ok(best) => best,
                    Err(Timeout) => return Ok(Err(Timeout)),
                };
            if improvement < self.config.min_improvement {
                info!(improvement, "improvement below threshold, hill climbing stops");
                return Ok(Ok(num_iterations));
            }
            let Some(best_pdb) = best.and_then(|index| candidates[index].take()) else {
                return Ok(Ok(num_iterations));
            };
            info!(improvement, pattern = ?best_pdb.pattern(), "adding pattern");
            current.add_pdb(best_pdb.clone());
            if let Err(Timeout) = self.generate_candidates(
                task,
                cost_type,
                &relevant_neighbours,
                &best_pdb,
                &mut generated_patterns,
                &mut candidates,
            )? {
                return Ok(Err(Timeout));
            }
        }
    }

    /// Adds a PDB for every unseen extension of the pattern of `pdb` by one
    /// relevant neighbour that stays within the size limit.
    fn generate_candidates(
        &mut self,
        task: &Task,
        cost_type: OperatorCost,
        relevant_neighbours: &[Vec<usize>],
        pdb: &PatternDatabase,
        generated_patterns: &mut BTreeSet<Pattern>,
        candidates: &mut Vec<Option<Rc<PatternDatabase>>>,
    ) -> Result<std::result::Result<(), Timeout>> {
        let pattern = pdb.pattern();
        for &var in pattern {
            for &neighbour in &relevant_neighbours[var] {
                if pattern.binary_search(&neighbour).is_ok() {
                    continue;
                }
                let within_limit = pdb
                    .size()
                    .checked_mul(task.domain_size(neighbour))
                    .is_some_and(|size| size <= self.config.pdb_max_size);
                if !within_limit {
                    self.num_rejected += 1;
                    continue;
                }
                let mut new_pattern = pattern.clone();
                new_pattern.push(neighbour);
                new_pattern.sort_unstable();
                if generated_patterns.insert(new_pattern.clone()) {
                    let candidate = PatternDatabase::new(task, new_pattern, cost_type, None)?;
                    candidates.push(Some(Rc::new(candidate)));
                }
                if let Err(Timeout) = self.check_time() {
                    return Ok(Err(Timeout));
                }
            }
        }
        Ok(Ok(()))
    }

    /// The largest number of samples some candidate improves, and that
    /// candidate. Candidates that no longer fit into the collection are
    /// dropped.
    fn find_best_improving_pdb(
        &self,
        current: &CanonicalPdbs,
        samples: &[Vec<usize>],
        samples_h: &[Cost],
        candidates: &mut [Option<Rc<PatternDatabase>>],
    ) -> std::result::Result<(usize, Option<usize>), Timeout> {
        let mut improvement = 0;
        let mut best = None;
        for (index, slot) in candidates.iter_mut().enumerate() {
            self.check_time()?;
            let Some(pdb) = slot.as_ref() else {
                continue;
            };
            if current.size().saturating_add(pdb.size()) > self.config.collection_max_size {
                *slot = None;
                continue;
            }
            let subsets = current.get_max_additive_subsets(pdb.pattern());
            let count = samples
                .iter()
                .zip(samples_h)
                .filter(|&(sample, &h)| is_heuristic_improved(pdb, sample, h, current, &subsets))
                .count();
            if count > 0 {
                debug!(pattern = ?pdb.pattern(), improvement = count);
            }
            if count > improvement {
                improvement = count;
                best = Some(index);
            }
        }
        Ok((improvement, best))
    }
}

/// Variables worth adding to a pattern containing `var`: its causal graph
/// predecessors along pre->eff arcs and the goal variables among its
/// successors.
fn compute_relevant_neighbours(task: &Task) -> Vec<Vec<usize>> {
    let causal_graph = CausalGraph::new(task);
    let goal_vars: BTreeSet<usize> = task.goal.iter().map(|goal| goal.var).collect();
    (0..task.num_variables())
        .map(|var| {
            let mut neighbours: BTreeSet<usize> =
                causal_graph.eff_to_pre(var).iter().copied().collect();
            neighbours.extend(
                causal_graph
                    .successors(var)
                    .iter()
                    .filter(|&&succ| goal_vars.contains(&succ)),
            );
            neighbours.into_iter().collect()
        })
        .collect()
}

/// Whether adding `pdb` to the collection raises the canonical heuristic
/// value of `sample` above `h_collection`.
fn is_heuristic_improved(
    pdb: &PatternDatabase,
    sample: &[usize],
    h_collection: Cost,
    current: &CanonicalPdbs,
    subsets: &[Vec<usize>],
) -> bool {
    let h_pattern = pdb.value(sample);
    if h_pattern == INFINITE_COST {
        return true;
    }
    if h_collection == INFINITE_COST {
        return false;
    }
    let mut h_values = Vec::with_capacity(current.pdbs().len());
    for other in current.pdbs() {
        let h = other.value(sample);
        if h == INFINITE_COST {
            return false;
        }
        h_values.push(h);
    }
    subsets.iter().any(|subset| {
        let h_subset = subset
            .iter()
            .fold(0, |sum: Cost, &i| sum.saturating_add(h_values[i]));
        h_pattern.saturating_add(h_subset) > h_collection
    })
}
