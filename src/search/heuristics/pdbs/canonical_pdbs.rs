use crate::search::{
    algorithms::compute_max_cliques,
    heuristics::{
        pdbs::{
            are_patterns_additive, compute_additive_vars, prune_dominated_subsets,
            validate_and_normalize_patterns, HillClimbingConfig, PatternCollectionHillClimbing,
            PatternDatabase,
        },
        Heuristic, HeuristicValue,
    },
    states::State,
    Cost, OperatorCost, Result, Task, INFINITE_COST,
};
use std::rc::Rc;
use tracing::info;

/// A collection of PDBs together with the maximal cliques of its
/// compatibility graph, where two PDBs are adjacent iff their patterns are
/// additive.
#[derive(Debug, Clone)]
pub struct CanonicalPdbs {
    pdbs: Vec<Rc<PatternDatabase>>,
    /// Indices into `pdbs`. Never empty: without PDBs the only clique is
    /// the empty one.
    cliques: Vec<Vec<usize>>,
    are_additive: Vec<Vec<bool>>,
    size: usize,
}

impl CanonicalPdbs {
    pub fn new(task: &Task, pdbs: Vec<Rc<PatternDatabase>>) -> Self {
        let mut canonical = Self {
            pdbs,
            cliques: vec![],
            are_additive: compute_additive_vars(task),
            size: 0,
        };
        canonical.size = canonical.pdbs.iter().map(|pdb| pdb.size()).sum();
        canonical.compute_cliques();
        canonical
    }

    fn compute_cliques(&mut self) {
        let mut graph = vec![vec![]; self.pdbs.len()];
        for i in 0..self.pdbs.len() {
            for j in i + 1..self.pdbs.len() {
                if are_patterns_additive(
                    self.pdbs[i].pattern(),
                    self.pdbs[j].pattern(),
                    &self.are_additive,
                ) {
                    graph[i].push(j);
                    graph[j].push(i);
                }
            }
        }
        self.cliques = compute_max_cliques(&graph);
    }

    pub fn add_pdb(&mut self, pdb: Rc<PatternDatabase>) {
        self.size += pdb.size();
        self.pdbs.push(pdb);
        self.compute_cliques();
    }

    pub fn pdbs(&self) -> &[Rc<PatternDatabase>] {
        &self.pdbs
    }

    pub fn cliques(&self) -> &[Vec<usize>] {
        &self.cliques
    }

    /// Total number of abstract states over all PDBs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// For every clique, the members that are additive with `new_pattern`.
    /// Subsets may repeat or be contained in one another, and the result
    /// holds at least the empty subset.
    pub fn get_max_additive_subsets(&self, new_pattern: &[usize]) -> Vec<Vec<usize>> {
        let mut subsets: Vec<Vec<usize>> = self
            .cliques
            .iter()
            .map(|clique| {
                clique
                    .iter()
                    .copied()
                    .filter(|&i| {
                        are_patterns_additive(new_pattern, self.pdbs[i].pattern(), &self.are_additive)
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|subset| !subset.is_empty())
            .collect();
        if subsets.is_empty() {
            subsets.push(vec![]);
        }
        subsets
    }

    /// The maximum over all cliques of the sum of the member values, or
    /// [`INFINITE_COST`] if any PDB recognises a dead end.
    pub fn value(&self, values: &[usize]) -> Cost {
        let mut h_values = Vec::with_capacity(self.pdbs.len());
        for pdb in &self.pdbs {
            let h = pdb.value(values);
            if h == INFINITE_COST {
                return INFINITE_COST;
            }
            h_values.push(h);
        }
        self.cliques
            .iter()
            .map(|clique| {
                clique
                    .iter()
                    .fold(0, |sum: Cost, &i| sum.saturating_add(h_values[i]))
            })
            .max()
            .unwrap_or(0)
    }

    pub fn is_dead_end(&self, values: &[usize]) -> bool {
        self.pdbs
            .iter()
            .any(|pdb| pdb.value(values) == INFINITE_COST)
    }

    /// Drops cliques dominated by another clique and the PDBs no remaining
    /// clique uses.
    pub fn prune_dominated(&mut self, num_variables: usize) {
        let patterns: Vec<_> = self.pdbs.iter().map(|pdb| pdb.pattern().clone()).collect();
        let num_cliques = self.cliques.len();
        let num_pdbs = self.pdbs.len();
        let (kept, cliques) = prune_dominated_subsets(&patterns, &self.cliques, num_variables);
        self.pdbs = kept.iter().map(|&i| self.pdbs[i].clone()).collect();
        self.cliques = cliques;
        self.size = self.pdbs.iter().map(|pdb| pdb.size()).sum();
        info!(
            pruned_cliques = num_cliques - self.cliques.len(),
            num_cliques,
            pruned_pdbs = num_pdbs - self.pdbs.len(),
            num_pdbs,
            "dominance pruning"
        );
    }
}

/// The canonical heuristic of a PDB collection.
#[derive(Debug)]
pub struct CanonicalPdbsHeuristic {
    canonical: CanonicalPdbs,
}

impl CanonicalPdbsHeuristic {
    /// Builds one PDB per pattern. An empty collection stands for one
    /// singleton pattern per goal variable.
    pub fn new(
        task: Rc<Task>,
        patterns: &[Vec<usize>],
        dominance_pruning: bool,
        cost_type: OperatorCost,
    ) -> Result<Self> {
        let patterns = validate_and_normalize_patterns(&task, patterns)?;
        let pdbs = patterns
            .into_iter()
            .map(|pattern| PatternDatabase::new(&task, pattern, cost_type, None).map(Rc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_collection(&task, CanonicalPdbs::new(&task, pdbs), dominance_pruning))
    }

    /// Uses the patterns found by hill climbing.
    pub fn from_hill_climbing(
        task: Rc<Task>,
        config: &HillClimbingConfig,
        dominance_pruning: bool,
        cost_type: OperatorCost,
    ) -> Result<Self> {
        let canonical = PatternCollectionHillClimbing::new(config.clone())?.generate(&task, cost_type)?;
        Ok(Self::from_collection(&task, canonical, dominance_pruning))
    }

    fn from_collection(task: &Task, mut canonical: CanonicalPdbs, dominance_pruning: bool) -> Self {
        if dominance_pruning {
            canonical.prune_dominated(task.num_variables());
        }
        info!(
            num_pdbs = canonical.pdbs().len(),
            num_cliques = canonical.cliques().len(),
            collection_size = canonical.size(),
            "canonical pdbs heuristic"
        );
        Self { canonical }
    }

    pub fn canonical_pdbs(&self) -> &CanonicalPdbs {
        &self.canonical
    }
}

impl Heuristic for CanonicalPdbsHeuristic {
    fn evaluate(&mut self, state: &State) -> HeuristicValue {
        HeuristicValue::from_cost(self.canonical.value(state.values()))
    }

    fn dead_ends_are_reliable(&self) -> bool {
        true
    }
}
