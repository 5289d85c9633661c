use crate::search::{successor_generators::SuccessorGenerator, Cost, OperatorCost, Task};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

/// Samples states by random walks from the initial state.
#[derive(Debug)]
pub struct RandomWalkSampler<'a> {
    task: &'a Task,
    successor_generator: SuccessorGenerator,
    average_operator_cost: f64,
}

impl<'a> RandomWalkSampler<'a> {
    pub fn new(task: &'a Task, cost_type: OperatorCost) -> Self {
        let total: f64 = task
            .operators
            .iter()
            .map(|op| f64::from(task.adjusted_cost(op.id, cost_type)))
            .sum();
        let average_operator_cost = if task.operators.is_empty() {
            0.0
        } else {
            total / task.operators.len() as f64
        };
        Self {
            task,
            successor_generator: SuccessorGenerator::new(task),
            average_operator_cost,
        }
    }

    pub fn average_operator_cost(&self) -> f64 {
        self.average_operator_cost
    }

    /// Walk length for the given estimate of the initial state: binomially
    /// distributed with `n = 4 * estimated plan length` and `p = 0.5`, so
    /// its mean is twice the estimated plan length.
    fn walk_length(&self, rng: &mut StdRng, init_h: Cost) -> usize {
        let n = if init_h == 0 || self.average_operator_cost <= 0.0 {
            10
        } else {
            let plan_length = (f64::from(init_h) / self.average_operator_cost).round() as usize;
            4 * plan_length
        };
        (0..n).filter(|_| rng.gen_bool(0.5)).count()
    }

    /// A walk that hits a state `is_dead_end` accepts restarts at the
    /// initial state. A walk that reaches a state without applicable
    /// operators ends there.
    pub fn sample_state(
        &self,
        rng: &mut StdRng,
        init_h: Cost,
        is_dead_end: impl Fn(&[usize]) -> bool,
    ) -> Vec<usize> {
        let length = self.walk_length(rng, init_h);
        let mut current = self.task.initial_state.clone();
        let mut applicable = vec![];
        for _ in 0..length {
            applicable.clear();
            self.successor_generator
                .generate_applicable_ops(&current, &mut applicable);
            let Some(&op) = applicable.choose(rng) else {
                break;
            };
            current = self.task.operator(op).apply(&current);
            if is_dead_end(&current) {
                current = self.task.initial_state.clone();
            }
        }
        current
    }
}
