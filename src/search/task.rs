use crate::parsed_types::{SasFact, SasTask};
use crate::parsers::{describe_error, Parser};
use crate::search::{
    Cost, Effect, Fact, Operator, OperatorCost, OperatorId, PlannerError, Result, Variable,
};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::info;

/// The only version of the SAS format that is accepted.
const SAS_VERSION: u32 = 3;

/// A validated, immutable SAS+ planning task. Components share it through an
/// `Rc<Task>`.
#[derive(Debug, Clone)]
pub struct Task {
    pub variables: Vec<Variable>,
    pub operators: Vec<Operator>,
    pub initial_state: Vec<usize>,
    /// Sorted by variable, at most one fact per variable.
    pub goal: Vec<Fact>,
    /// `mutexes[var][value]` holds the facts of other variables that are
    /// mutex with `var=value`.
    mutexes: Vec<Vec<HashSet<Fact>>>,
    is_unit_cost: bool,
}

impl Task {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_text(&text)
    }

    pub fn from_text(text: &str) -> Result<Self> {
        let (remainder, sas_task) = SasTask::parse(text)
            .map_err(|e| PlannerError::Parse(describe_error(&e)))?;
        if sas_task.num_axioms() > 0 {
            return Err(PlannerError::UnsupportedFeature(format!(
                "{} axioms",
                sas_task.num_axioms()
            )));
        }
        if !remainder.fragment().trim().is_empty() {
            return Err(PlannerError::Parse(format!(
                "unexpected input at line {}",
                remainder.location_line()
            )));
        }
        Self::from_sas(&sas_task)
    }

    pub fn from_sas(sas_task: &SasTask) -> Result<Self> {
        if sas_task.version() != SAS_VERSION {
            return Err(PlannerError::UnsupportedFeature(format!(
                "SAS version {}, expected {}",
                sas_task.version(),
                SAS_VERSION
            )));
        }

        let mut variables = Vec::with_capacity(sas_task.variables().len());
        for (id, sas_variable) in sas_task.variables().iter().enumerate() {
            if sas_variable.axiom_layer() != -1 {
                return Err(PlannerError::UnsupportedFeature(format!(
                    "derived variable {}",
                    sas_variable.name()
                )));
            }
            if sas_variable.domain_size() == 0 {
                return Err(PlannerError::InvalidTask(format!(
                    "variable {} has an empty domain",
                    sas_variable.name()
                )));
            }
            variables.push(Variable {
                id,
                name: sas_variable.name().to_string(),
                fact_names: sas_variable.value_names().clone(),
            });
        }
        let check_fact = |fact: &SasFact| -> Result<Fact> {
            match variables.get(fact.var()) {
                None => Err(PlannerError::VariableOutOfRange {
                    var: fact.var(),
                    num_variables: variables.len(),
                }),
                Some(variable) if fact.value() >= variable.domain_size() => {
                    Err(PlannerError::InvalidTask(format!(
                        "value {} out of range for variable {}",
                        fact.value(),
                        variable.name
                    )))
                }
                Some(_) => Ok(Fact::new(fact.var(), fact.value())),
            }
        };

        if sas_task.initial_state().len() != variables.len() {
            return Err(PlannerError::InvalidTask(format!(
                "initial state has {} values for {} variables",
                sas_task.initial_state().len(),
                variables.len()
            )));
        }
        for (var, &value) in sas_task.initial_state().iter().enumerate() {
            check_fact(&SasFact::new(var, value))?;
        }
        let initial_state = sas_task.initial_state().clone();

        let goal = collect_facts(
            sas_task
                .goal()
                .iter()
                .map(check_fact)
                .collect::<Result<Vec<_>>>()?,
            "goal",
        )?;

        let mut operators = Vec::with_capacity(sas_task.operators().len());
        for (id, sas_op) in sas_task.operators().iter().enumerate() {
            let mut preconditions = sas_op
                .prevail()
                .iter()
                .map(check_fact)
                .collect::<Result<Vec<_>>>()?;
            let mut effects = Vec::with_capacity(sas_op.effects().len());
            for sas_effect in sas_op.effects() {
                let fact = check_fact(&SasFact::new(sas_effect.var(), sas_effect.post()))?;
                if let Some(pre) = sas_effect.pre() {
                    preconditions.push(check_fact(&SasFact::new(sas_effect.var(), pre))?);
                }
                let conditions = sas_effect
                    .conditions()
                    .iter()
                    .map(check_fact)
                    .collect::<Result<Vec<_>>>()?;
                effects.push(Effect { conditions, fact });
            }
            if sas_op.cost() < 0 {
                return Err(PlannerError::InvalidTask(format!(
                    "operator {} has negative cost",
                    sas_op.name()
                )));
            }
            operators.push(Operator {
                id: OperatorId(id),
                name: sas_op.name().to_string(),
                preconditions: collect_facts(preconditions, sas_op.name())?,
                effects,
                cost: if sas_task.use_metric() { sas_op.cost() } else { 1 },
            });
        }

        let mut mutexes: Vec<Vec<HashSet<Fact>>> = variables
            .iter()
            .map(|variable| vec![HashSet::new(); variable.domain_size()])
            .collect();
        for group in sas_task.mutex_groups() {
            let facts = group.iter().map(check_fact).collect::<Result<Vec<_>>>()?;
            for &a in &facts {
                for &b in &facts {
                    if a.var != b.var {
                        mutexes[a.var][a.value].insert(b);
                    }
                }
            }
        }

        let is_unit_cost = operators.iter().all(|op| op.cost == 1);
        info!(
            num_variables = variables.len(),
            num_operators = operators.len(),
            num_goals = goal.len(),
            num_mutex_groups = sas_task.mutex_groups().len(),
            is_unit_cost,
        );

        Ok(Self {
            variables,
            operators,
            initial_state,
            goal,
            mutexes,
            is_unit_cost,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn domain_size(&self, var: usize) -> usize {
        self.variables[var].domain_size()
    }

    pub fn domain_sizes(&self) -> Vec<usize> {
        self.variables.iter().map(Variable::domain_size).collect()
    }

    pub fn operator(&self, id: OperatorId) -> &Operator {
        &self.operators[id.0]
    }

    pub fn fact_name(&self, fact: Fact) -> &str {
        self.variables[fact.var].fact_name(fact.value)
    }

    /// Whether the two facts can never hold together. Different values of
    /// one variable are always mutex.
    pub fn are_facts_mutex(&self, a: Fact, b: Fact) -> bool {
        if a.var == b.var {
            return a.value != b.value;
        }
        self.mutexes[a.var][a.value].contains(&b)
    }

    pub fn is_goal(&self, values: &[usize]) -> bool {
        self.goal.iter().all(|fact| fact.holds_in(values))
    }

    pub fn is_unit_cost(&self) -> bool {
        self.is_unit_cost
    }

    pub fn has_conditional_effects(&self) -> bool {
        self.operators.iter().any(Operator::has_conditional_effects)
    }

    pub fn adjusted_cost(&self, id: OperatorId, cost_type: OperatorCost) -> Cost {
        cost_type.adjust(self.operator(id).cost, self.is_unit_cost)
    }

    /// The cheapest adjusted operator cost, 0 for a task without operators.
    pub fn min_operator_cost(&self, cost_type: OperatorCost) -> Cost {
        self.operators
            .iter()
            .map(|op| self.adjusted_cost(op.id, cost_type))
            .min()
            .unwrap_or(0)
    }
}

/// Sorts facts by variable, dropping duplicates and rejecting two different
/// values for one variable.
fn collect_facts(facts: Vec<Fact>, context: &str) -> Result<Vec<Fact>> {
    let mut by_var = BTreeMap::new();
    for fact in facts {
        if let Some(value) = by_var.insert(fact.var, fact.value) {
            if value != fact.value {
                return Err(PlannerError::InvalidTask(format!(
                    "conflicting conditions on variable {} in {}",
                    fact.var, context
                )));
            }
        }
    }
    Ok(by_var
        .into_iter()
        .map(|(var, value)| Fact::new(var, value))
        .collect())
}
