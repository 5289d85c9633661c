//! Contains the [`SasTask`] type, the top level of a parsed SAS file.

use crate::parsed_types::{SasFact, SasOperator, SasVariable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasTask {
    version: u32,
    /// Whether the operator costs are to be used. Without a metric all
    /// operators cost 1.
    use_metric: bool,
    variables: Vec<SasVariable>,
    mutex_groups: Vec<Vec<SasFact>>,
    initial_state: Vec<usize>,
    goal: Vec<SasFact>,
    operators: Vec<SasOperator>,
    num_axioms: usize,
}

impl SasTask {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        version: u32,
        use_metric: bool,
        variables: Vec<SasVariable>,
        mutex_groups: Vec<Vec<SasFact>>,
        initial_state: Vec<usize>,
        goal: Vec<SasFact>,
        operators: Vec<SasOperator>,
        num_axioms: usize,
    ) -> Self {
        Self {
            version,
            use_metric,
            variables,
            mutex_groups,
            initial_state,
            goal,
            operators,
            num_axioms,
        }
    }

    pub const fn version(&self) -> u32 {
        self.version
    }

    pub const fn use_metric(&self) -> bool {
        self.use_metric
    }

    pub const fn variables(&self) -> &Vec<SasVariable> {
        &self.variables
    }

    pub const fn mutex_groups(&self) -> &Vec<Vec<SasFact>> {
        &self.mutex_groups
    }

    pub const fn initial_state(&self) -> &Vec<usize> {
        &self.initial_state
    }

    pub const fn goal(&self) -> &Vec<SasFact> {
        &self.goal
    }

    pub const fn operators(&self) -> &Vec<SasOperator> {
        &self.operators
    }

    pub const fn num_axioms(&self) -> usize {
        self.num_axioms
    }
}
