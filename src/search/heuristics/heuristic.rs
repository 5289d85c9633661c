use crate::search::{
    algorithms::DynamicBitset,
    heuristics::{
        landmarks::LandmarkCountHeuristic,
        pdbs::{CanonicalPdbsHeuristic, HillClimbingConfig, Pattern, PdbHeuristic, ZeroOnePdbs},
        BlindHeuristic, CeaHeuristic, CgHeuristic, GoalCountHeuristic, HmHeuristic,
    },
    states::State,
    Cost, OperatorCost, OperatorId, Result, Task, INFINITE_COST,
};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::rc::Rc;

/// The result of evaluating a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicValue {
    Estimate(Cost),
    DeadEnd,
}

impl HeuristicValue {
    /// [`INFINITE_COST`] is a dead end, every other cost an estimate.
    pub fn from_cost(cost: Cost) -> Self {
        if cost == INFINITE_COST {
            HeuristicValue::DeadEnd
        } else {
            HeuristicValue::Estimate(cost)
        }
    }

    pub fn is_dead_end(&self) -> bool {
        matches!(self, HeuristicValue::DeadEnd)
    }

    /// The estimate.
    ///
    /// # Panics
    /// If the value is a dead end.
    pub fn value(&self) -> Cost {
        match self {
            HeuristicValue::Estimate(h) => *h,
            HeuristicValue::DeadEnd => panic!("dead ends have no heuristic value"),
        }
    }
}

pub trait Heuristic: Debug {
    /// Evaluate the given state. A heuristic returns an estimate of 0 for
    /// every goal state.
    fn evaluate(&mut self, state: &State) -> HeuristicValue;

    /// Whether a [`HeuristicValue::DeadEnd`] of this heuristic proves that
    /// no goal is reachable.
    fn dead_ends_are_reliable(&self) -> bool;

    /// The operators the last call to [`Heuristic::evaluate`] marked as
    /// preferred, without duplicates.
    fn preferred_operators(&self) -> &[OperatorId] {
        &[]
    }

    /// Called once with the initial state before the search starts.
    fn notify_initial_state(&mut self, _state: &State) {}

    /// Called for every transition the search generates, for heuristics
    /// that keep per-state information.
    fn notify_state_transition(&mut self, _parent: &State, _op: OperatorId, _state: &State) {}
}

/// Preferred operators of one evaluation. Marking an operator twice has no
/// effect.
#[derive(Debug, Clone)]
pub struct PreferredOperators {
    marked: DynamicBitset,
    operators: Vec<OperatorId>,
}

impl PreferredOperators {
    pub fn new(num_operators: usize) -> Self {
        Self {
            marked: DynamicBitset::new(num_operators),
            operators: vec![],
        }
    }

    pub fn mark(&mut self, op: OperatorId) {
        if !self.marked.test(op.0) {
            self.marked.set(op.0);
            self.operators.push(op);
        }
    }

    pub fn contains(&self, op: OperatorId) -> bool {
        self.marked.test(op.0)
    }

    pub fn clear(&mut self) {
        for op in self.operators.drain(..) {
            self.marked.reset(op.0);
        }
    }

    pub fn as_slice(&self) -> &[OperatorId] {
        &self.operators
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[clap(rename_all = "kebab-case")]
pub enum HeuristicName {
    #[clap(help = "Zero on goal states, the cheapest operator cost otherwise.")]
    Blind,
    #[clap(help = "The number of unsatisfied goal facts.")]
    Goalcount,
    #[clap(name = "hm", help = "The h^m heuristic with m = 2.")]
    Hm,
    #[clap(name = "cg", help = "The causal graph heuristic.")]
    Cg,
    #[clap(name = "cea", help = "The context-enhanced additive heuristic.")]
    Cea,
    #[clap(help = "A single pattern database over all goal variables.")]
    Pdb,
    #[clap(help = "The canonical heuristic over one PDB per goal variable.")]
    Cpdb,
    #[clap(help = "Zero-one cost partitioning over one PDB per goal variable.")]
    Zopdbs,
    #[clap(help = "The canonical heuristic over patterns found by hill climbing.")]
    Ipdb,
    #[clap(help = "The landmark count heuristic.")]
    Lmcount,
}

/// A heuristic and its parameters, as read from a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "kebab-case")]
pub enum HeuristicConfig {
    Blind {
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Goalcount,
    Hm {
        #[serde(default = "default_m")]
        m: usize,
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Cg {
        #[serde(default)]
        cost_type: OperatorCost,
        #[serde(default = "default_max_cache_size")]
        max_cache_size: usize,
    },
    Cea {
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Pdb {
        /// Defaults to all goal variables.
        #[serde(default)]
        pattern: Pattern,
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Cpdb {
        /// Defaults to one singleton pattern per goal variable.
        #[serde(default)]
        patterns: Vec<Pattern>,
        #[serde(default = "default_true")]
        dominance_pruning: bool,
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Zopdbs {
        #[serde(default)]
        patterns: Vec<Pattern>,
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Ipdb {
        #[serde(default)]
        hill_climbing: HillClimbingConfig,
        #[serde(default = "default_true")]
        dominance_pruning: bool,
        #[serde(default)]
        cost_type: OperatorCost,
    },
    Lmcount {
        #[serde(default)]
        cost_type: OperatorCost,
    },
}

fn default_m() -> usize {
    2
}

fn default_max_cache_size() -> usize {
    1_000_000
}

fn default_true() -> bool {
    true
}

impl From<HeuristicName> for HeuristicConfig {
    fn from(name: HeuristicName) -> Self {
        let cost_type = OperatorCost::default();
        match name {
            HeuristicName::Blind => HeuristicConfig::Blind { cost_type },
            HeuristicName::Goalcount => HeuristicConfig::Goalcount,
            HeuristicName::Hm => HeuristicConfig::Hm {
                m: default_m(),
                cost_type,
            },
            HeuristicName::Cg => HeuristicConfig::Cg {
                cost_type,
                max_cache_size: default_max_cache_size(),
            },
            HeuristicName::Cea => HeuristicConfig::Cea { cost_type },
            HeuristicName::Pdb => HeuristicConfig::Pdb {
                pattern: vec![],
                cost_type,
            },
            HeuristicName::Cpdb => HeuristicConfig::Cpdb {
                patterns: vec![],
                dominance_pruning: true,
                cost_type,
            },
            HeuristicName::Zopdbs => HeuristicConfig::Zopdbs {
                patterns: vec![],
                cost_type,
            },
            HeuristicName::Ipdb => HeuristicConfig::Ipdb {
                hill_climbing: HillClimbingConfig::default(),
                dominance_pruning: true,
                cost_type,
            },
            HeuristicName::Lmcount => HeuristicConfig::Lmcount { cost_type },
        }
    }
}

impl HeuristicConfig {
    /// Builds the heuristic. Invalid parameters are reported before any
    /// search starts.
    pub fn create(&self, task: Rc<Task>) -> Result<Box<dyn Heuristic>> {
        Ok(match self {
            HeuristicConfig::Blind { cost_type } => {
                Box::new(BlindHeuristic::new(task, *cost_type))
            }
            HeuristicConfig::Goalcount => Box::new(GoalCountHeuristic::new(task)),
            HeuristicConfig::Hm { m, cost_type } => {
                Box::new(HmHeuristic::new(task, *m, *cost_type)?)
            }
            HeuristicConfig::Cg {
                cost_type,
                max_cache_size,
            } => Box::new(CgHeuristic::new(task, *cost_type, *max_cache_size)),
            HeuristicConfig::Cea { cost_type } => Box::new(CeaHeuristic::new(task, *cost_type)),
            HeuristicConfig::Pdb { pattern, cost_type } => {
                Box::new(PdbHeuristic::new(task, pattern, *cost_type)?)
            }
            HeuristicConfig::Cpdb {
                patterns,
                dominance_pruning,
                cost_type,
            } => Box::new(CanonicalPdbsHeuristic::new(
                task,
                patterns,
                *dominance_pruning,
                *cost_type,
            )?),
            HeuristicConfig::Zopdbs {
                patterns,
                cost_type,
            } => Box::new(ZeroOnePdbs::new(task, patterns, *cost_type)?),
            HeuristicConfig::Ipdb {
                hill_climbing,
                dominance_pruning,
                cost_type,
            } => Box::new(CanonicalPdbsHeuristic::from_hill_climbing(
                task,
                hill_climbing,
                *dominance_pruning,
                *cost_type,
            )?),
            HeuristicConfig::Lmcount { cost_type } => {
                Box::new(LandmarkCountHeuristic::new(task, *cost_type))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::states::StateRegistry;
    use crate::test_utils::*;
    use clap::ValueEnum;

    #[test]
    fn dead_end_conversion() {
        assert_eq!(HeuristicValue::from_cost(3), HeuristicValue::Estimate(3));
        assert!(HeuristicValue::from_cost(INFINITE_COST).is_dead_end());
        assert_eq!(HeuristicValue::Estimate(7).value(), 7);
    }

    #[test]
    #[should_panic]
    fn dead_end_has_no_value() {
        HeuristicValue::DeadEnd.value();
    }

    #[test]
    fn marking_is_idempotent() {
        let mut preferred = PreferredOperators::new(4);
        preferred.mark(OperatorId(2));
        preferred.mark(OperatorId(0));
        preferred.mark(OperatorId(2));
        assert_eq!(preferred.as_slice(), &[OperatorId(2), OperatorId(0)]);
        assert!(preferred.contains(OperatorId(0)));
        assert!(!preferred.contains(OperatorId(1)));
        preferred.clear();
        assert!(preferred.as_slice().is_empty());
        preferred.mark(OperatorId(2));
        assert_eq!(preferred.as_slice(), &[OperatorId(2)]);
    }

    #[test]
    fn every_named_heuristic_is_zero_on_goals() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let mut registry = StateRegistry::new(task.clone()).unwrap();
        let goal = registry.register_values(&[1, 2]);
        for name in HeuristicName::value_variants() {
            let mut heuristic = HeuristicConfig::from(*name).create(task.clone()).unwrap();
            heuristic.notify_initial_state(&goal);
            assert_eq!(
                heuristic.evaluate(&goal),
                HeuristicValue::Estimate(0),
                "{:?}",
                name
            );
        }
    }

    #[test]
    fn configs_read_from_toml() {
        let config: HeuristicConfig =
            toml::from_str("name = \"cpdb\"\npatterns = [[0], [1, 0]]\n").unwrap();
        assert_eq!(
            config,
            HeuristicConfig::Cpdb {
                patterns: vec![vec![0], vec![1, 0]],
                dominance_pruning: true,
                cost_type: OperatorCost::Normal,
            }
        );
        let config: HeuristicConfig = toml::from_str("name = \"hm\"\ncost_type = \"one\"\n").unwrap();
        assert_eq!(
            config,
            HeuristicConfig::Hm {
                m: 2,
                cost_type: OperatorCost::One,
            }
        );
        assert!(toml::from_str::<HeuristicConfig>("name = \"ff\"\n").is_err());
    }
}
