//! Planner configuration, read from TOML files. Every field has a default,
//! so a configuration file only names what it changes:
//!
//! ```toml
//! engine = "astar"
//! time_limit = "5min"
//!
//! [[heuristics]]
//! name = "ipdb"
//! hill_climbing = { pdb_max_size = 100000 }
//! ```

use crate::search::{
    heuristics::{HeuristicConfig, HeuristicName},
    open_lists::DEFAULT_BOOST,
    search_engines::{SearchEngine, SearchEngineName, TerminationCondition},
    Cost, OperatorCost, PlannerError, Result, Task,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub engine: SearchEngineName,
    /// Indices into `heuristics` of the heuristics whose preferred operators
    /// the search uses.
    pub preferred: Vec<usize>,
    /// Cost transformation used by the search for g-values.
    pub cost_type: OperatorCost,
    pub boost: i32,
    /// Defaults to true for A* and false otherwise.
    pub reopen_closed: Option<bool>,
    pub bound: Option<Cost>,
    /// Weight of the heuristic in A*.
    pub weight: Cost,
    #[serde(with = "optional_duration", skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<Duration>,
    pub memory_limit_mb: Option<usize>,
    pub max_expansions: Option<usize>,
    /// Last, since TOML writes arrays of tables after plain values.
    pub heuristics: Vec<HeuristicConfig>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            engine: SearchEngineName::default(),
            preferred: vec![0],
            cost_type: OperatorCost::default(),
            boost: DEFAULT_BOOST,
            reopen_closed: None,
            bound: None,
            weight: 1,
            time_limit: None,
            memory_limit_mb: None,
            max_expansions: None,
            heuristics: vec![HeuristicConfig::from(HeuristicName::Cea)],
        }
    }
}

impl PlannerConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| PlannerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PlannerError::InvalidConfig(e.to_string()))
    }

    /// Checks the parameters that do not depend on the task.
    pub fn validate(&self) -> Result<()> {
        if self.heuristics.is_empty() {
            return Err(PlannerError::InvalidConfig(
                "at least one heuristic is needed".to_string(),
            ));
        }
        if self.weight < 1 {
            return Err(PlannerError::InvalidConfig(format!(
                "weight {} is below 1",
                self.weight
            )));
        }
        if self.boost < 0 {
            return Err(PlannerError::InvalidConfig(format!(
                "negative boost {}",
                self.boost
            )));
        }
        if let Some(bound) = self.bound.filter(|&bound| bound < 0) {
            return Err(PlannerError::InvalidConfig(format!(
                "negative cost bound {}",
                bound
            )));
        }
        Ok(())
    }

    pub fn create_search_engine(&self, task: Rc<Task>) -> Result<Box<dyn SearchEngine>> {
        self.validate()?;
        info!(engine = ?self.engine, heuristics = ?self.heuristics, "creating search engine");
        self.engine.create(task, self)
    }

    pub fn termination_condition(&self) -> TerminationCondition {
        TerminationCondition::new(self.time_limit, self.memory_limit_mb, self.max_expansions)
    }
}

/// (De)serializes an `Option<Duration>` as a human readable string such as
/// `"1h 30min"`.
pub mod optional_duration {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => {
                serializer.serialize_some(&humantime::format_duration(*duration).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| humantime::parse_duration(&text).map_err(D::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{
        heuristics::pdbs::HillClimbingConfig,
        search_engines::{SearchResult, SearchStatus},
    };
    use crate::test_utils::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = PlannerConfig::from_toml("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.engine, SearchEngineName::LazyGreedy);
        assert_eq!(config.boost, 1000);
    }

    #[test]
    fn full_config() {
        let config = PlannerConfig::from_toml(
            r#"
            engine = "astar"
            cost_type = "one"
            reopen_closed = false
            bound = 10
            weight = 2
            time_limit = "1h 30min"
            max_expansions = 5000
            preferred = []

            [[heuristics]]
            name = "ipdb"
            hill_climbing = { pdb_max_size = 1000, max_time = "10s" }
            "#,
        )
        .unwrap();
        assert_eq!(config.engine, SearchEngineName::Astar);
        assert_eq!(config.cost_type, OperatorCost::One);
        assert_eq!(config.reopen_closed, Some(false));
        assert_eq!(config.time_limit, Some(Duration::from_secs(5400)));
        assert_eq!(config.max_expansions, Some(5000));
        assert_eq!(
            config.heuristics,
            vec![HeuristicConfig::Ipdb {
                hill_climbing: HillClimbingConfig {
                    pdb_max_size: 1000,
                    max_time: Some(Duration::from_secs(10)),
                    ..HillClimbingConfig::default()
                },
                dominance_pruning: true,
                cost_type: OperatorCost::Normal,
            }]
        );
    }

    #[test]
    fn round_trip_through_toml() {
        let config = PlannerConfig {
            time_limit: Some(Duration::from_secs(90)),
            max_expansions: Some(7),
            ..PlannerConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("time_limit = \"1m 30s\""));
        assert_eq!(PlannerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn invalid_configs() {
        for text in [
            "weight = 0",
            "boost = -1",
            "bound = -3",
            "heuristics = []",
            "time_limit = \"soon\"",
            "engine = \"ida\"",
            "unknown_field = 1",
        ] {
            assert!(
                matches!(
                    PlannerConfig::from_toml(text),
                    Err(PlannerError::InvalidConfig(_))
                ),
                "{}",
                text
            );
        }
    }

    #[test]
    fn config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine = \"eager-greedy\"").unwrap();
        let config = PlannerConfig::from_path(file.path()).unwrap();
        assert_eq!(config.engine, SearchEngineName::EagerGreedy);
        assert!(matches!(
            PlannerConfig::from_path(Path::new("/nonexistent/planner.toml")),
            Err(PlannerError::Io(_))
        ));
    }

    #[test]
    fn every_engine_solves_truck() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        for engine in [
            SearchEngineName::LazyGreedy,
            SearchEngineName::EagerGreedy,
            SearchEngineName::Astar,
        ] {
            let config = PlannerConfig {
                engine,
                ..PlannerConfig::default()
            };
            let mut search = config.create_search_engine(task.clone()).unwrap();
            let result = search.search(&mut config.termination_condition());
            let SearchResult::Success(plan) = result else {
                panic!("{:?} found no plan: {:?}", engine, result);
            };
            assert!(task.is_goal(&plan.execute(&task).unwrap()));
            assert_eq!(search.status(), SearchStatus::Solved);
        }
    }

    #[test]
    fn invalid_preferred_index() {
        let task = Rc::new(Task::from_text(TRUCK_SAS_TEXT).unwrap());
        let config = PlannerConfig {
            preferred: vec![3],
            ..PlannerConfig::default()
        };
        assert!(matches!(
            config.create_search_engine(task),
            Err(PlannerError::InvalidConfig(_))
        ));
    }
}
