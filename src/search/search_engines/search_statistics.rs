use crate::search::{heuristics::HeuristicValue, Cost};
use std::time::{Duration, Instant};
use tracing::info;

const LOG_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct SearchStatistics {
    /// Number of states whose successors were generated
    expanded_states: usize,
    /// Number of states evaluated by the heuristics
    evaluated_states: usize,
    /// Number of successor states generated, including duplicates
    generated_states: usize,
    /// Number of closed states opened again with a cheaper path
    reopened_states: usize,
    /// Number of states pruned as dead ends
    dead_end_states: usize,
    /// Number of applicable operators generated
    generated_operators: usize,
    /// Best value seen so far per heuristic
    best_heuristic_values: Vec<Option<Cost>>,
    search_start_time: Instant,
    last_log_time: Instant,
}

impl SearchStatistics {
    pub fn new(num_heuristics: usize) -> Self {
        info!("starting search");
        Self {
            expanded_states: 0,
            evaluated_states: 0,
            generated_states: 0,
            reopened_states: 0,
            dead_end_states: 0,
            generated_operators: 0,
            best_heuristic_values: vec![None; num_heuristics],
            search_start_time: Instant::now(),
            last_log_time: Instant::now(),
        }
    }

    pub fn expanded_states(&self) -> usize {
        self.expanded_states
    }

    pub fn evaluated_states(&self) -> usize {
        self.evaluated_states
    }

    pub fn generated_states(&self) -> usize {
        self.generated_states
    }

    pub fn reopened_states(&self) -> usize {
        self.reopened_states
    }

    pub fn dead_end_states(&self) -> usize {
        self.dead_end_states
    }

    pub fn generated_operators(&self) -> usize {
        self.generated_operators
    }

    pub fn best_heuristic_values(&self) -> &[Option<Cost>] {
        &self.best_heuristic_values
    }

    pub fn increment_expanded_states(&mut self) {
        self.expanded_states += 1;
        self.log_if_needed();
    }

    pub fn increment_evaluated_states(&mut self) {
        self.evaluated_states += 1;
        self.log_if_needed();
    }

    pub fn increment_generated_states(&mut self) {
        self.generated_states += 1;
    }

    pub fn increment_reopened_states(&mut self) {
        self.reopened_states += 1;
    }

    pub fn increment_dead_end_states(&mut self) {
        self.dead_end_states += 1;
    }

    pub fn increment_generated_operators(&mut self, num_operators: usize) {
        self.generated_operators += num_operators;
    }

    /// Records the heuristic values of a newly evaluated state. Returns
    /// whether some heuristic reached a new best value, which counts as
    /// progress.
    pub fn report_heuristic_values(&mut self, h_values: &[HeuristicValue]) -> bool {
        let mut progress = false;
        for (best, value) in self.best_heuristic_values.iter_mut().zip(h_values) {
            let HeuristicValue::Estimate(h) = *value else {
                continue;
            };
            if best.map_or(true, |best| h < best) {
                *best = Some(h);
                progress = true;
            }
        }
        if progress {
            info!(
                best_heuristic_values = ?self.best_heuristic_values,
                expanded_states = self.expanded_states,
                "new best heuristic values"
            );
        }
        progress
    }

    fn log_if_needed(&mut self) {
        if self.last_log_time.elapsed() > LOG_INTERVAL {
            self.last_log_time = Instant::now();
            self.log();
        }
    }

    fn log(&self) {
        info!(
            expanded_states = self.expanded_states,
            evaluated_states = self.evaluated_states,
            generated_states = self.generated_states,
            reopened_states = self.reopened_states,
            dead_end_states = self.dead_end_states,
            generated_operators = self.generated_operators,
            best_heuristic_values = ?self.best_heuristic_values,
        );
    }

    pub fn finalise_search(&self) {
        info!("finalising search");
        self.log();
        info!(search_duration = self.search_start_time.elapsed().as_secs_f64());
    }
}
