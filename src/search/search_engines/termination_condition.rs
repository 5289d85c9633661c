use crate::search::search_engines::SearchResult;
use memory_stats::memory_stats;
use std::time::{Duration, Instant};
use tracing::info;

/// Memory usage is sampled once per this many checks.
const MEMORY_CHECK_INTERVAL: usize = 1024;

/// Limits on a search, checked once per search step.
#[derive(Debug)]
pub struct TerminationCondition {
    time_limit: Option<Duration>,
    memory_limit_mb: Option<usize>,
    max_expansions: Option<usize>,
    start_time: Instant,
    num_checks: usize,
    peak_memory_usage_mb: Option<usize>,
    last_log_time: Instant,
}

impl TerminationCondition {
    pub fn new(
        time_limit: Option<Duration>,
        memory_limit_mb: Option<usize>,
        max_expansions: Option<usize>,
    ) -> Self {
        info!(
            time_limit = time_limit.map(|d| d.as_secs_f64()),
            memory_limit_mb = memory_limit_mb,
            max_expansions = max_expansions,
        );
        Self {
            time_limit,
            memory_limit_mb,
            max_expansions,
            start_time: Instant::now(),
            num_checks: 0,
            peak_memory_usage_mb: None,
            last_log_time: Instant::now(),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(None, None, None)
    }

    pub fn log_if_needed(&mut self) {
        if self.last_log_time.elapsed() > Duration::from_secs(10) {
            self.last_log_time = Instant::now();
            self.log();
        }
    }

    fn update_memory_usage(&mut self) -> Option<usize> {
        let memory_usage = memory_stats().map(|usage| usage.physical_mem / 1024 / 1024);
        self.peak_memory_usage_mb = self.peak_memory_usage_mb.max(memory_usage);
        memory_usage
    }

    pub fn log(&mut self) {
        let memory_usage = self.update_memory_usage();
        info!(
            memory_usage_mb = memory_usage,
            time_elapsed = self.start_time.elapsed().as_secs_f64(),
        );
    }

    pub fn finalise(&mut self) {
        self.update_memory_usage();
        info!(
            peak_recorded_memory_usage_mb = self.peak_memory_usage_mb,
            total_time_used = self.start_time.elapsed().as_secs_f64(),
        );
    }

    /// The result to end the search with if a limit is exceeded.
    pub fn should_terminate(&mut self, expanded_states: usize) -> Option<SearchResult> {
        self.num_checks += 1;
        if let Some(max_expansions) = self.max_expansions {
            if expanded_states >= max_expansions {
                return Some(SearchResult::ExpansionLimitExceeded);
            }
        }
        if let Some(time_limit) = self.time_limit {
            if self.start_time.elapsed() > time_limit {
                return Some(SearchResult::TimeLimitExceeded);
            }
        }
        if let Some(memory_limit_mb) = self.memory_limit_mb {
            if self.num_checks % MEMORY_CHECK_INTERVAL == 1 {
                self.update_memory_usage();
            }
            if let Some(peak_usage) = self.peak_memory_usage_mb {
                if peak_usage > memory_limit_mb {
                    return Some(SearchResult::MemoryLimitExceeded);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_limit() {
        let mut termination = TerminationCondition::new(None, None, Some(3));
        assert_eq!(termination.should_terminate(2), None);
        assert_eq!(
            termination.should_terminate(3),
            Some(SearchResult::ExpansionLimitExceeded)
        );
    }

    #[test]
    fn zero_time_limit() {
        let mut termination = TerminationCondition::new(Some(Duration::ZERO), None, None);
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(
            termination.should_terminate(0),
            Some(SearchResult::TimeLimitExceeded)
        );
    }

    #[test]
    fn unlimited_never_terminates() {
        let mut termination = TerminationCondition::unlimited();
        for expanded in 0..2000 {
            assert_eq!(termination.should_terminate(expanded), None);
        }
    }
}
