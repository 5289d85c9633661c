//! Removes redundant cliques from a canonical PDB collection. A clique is
//! dominated by another one if each of its patterns is a subset of some
//! pattern of the other, so its sum can never be the maximum.

use crate::search::heuristics::pdbs::Pattern;

/// Checks patterns and cliques against one "current" clique.
#[derive(Debug)]
struct Pruner<'a> {
    patterns: &'a [Pattern],
    cliques: &'a [Vec<usize>],
    /// `var_patterns[v]` lists the patterns of the current clique that
    /// contain `v`.
    var_patterns: Vec<Vec<usize>>,
    dominated_patterns: Vec<bool>,
}

impl<'a> Pruner<'a> {
    fn new(patterns: &'a [Pattern], cliques: &'a [Vec<usize>], num_variables: usize) -> Self {
        Self {
            patterns,
            cliques,
            var_patterns: vec![vec![]; num_variables],
            dominated_patterns: vec![false; patterns.len()],
        }
    }

    fn set_current_clique(&mut self, clique: usize) {
        for patterns in &mut self.var_patterns {
            patterns.clear();
        }
        for &pattern in &self.cliques[clique] {
            for &var in &self.patterns[pattern] {
                self.var_patterns[var].push(pattern);
            }
        }
        for pattern in 0..self.patterns.len() {
            self.dominated_patterns[pattern] = self.is_pattern_dominated(pattern);
        }
    }

    /// Whether some pattern of the current clique contains every variable of
    /// the pattern.
    fn is_pattern_dominated(&self, pattern: usize) -> bool {
        let vars = &self.patterns[pattern];
        let Some((&first, rest)) = vars.split_first() else {
            return true;
        };
        self.var_patterns[first].iter().any(|candidate| {
            rest.iter()
                .all(|&var| self.var_patterns[var].contains(candidate))
        })
    }

    fn is_clique_dominated(&self, clique: usize) -> bool {
        self.cliques[clique]
            .iter()
            .all(|&pattern| self.dominated_patterns[pattern])
    }

    fn pruned_cliques(mut self) -> Vec<bool> {
        let mut pruned = vec![false; self.cliques.len()];
        // Pruned cliques do not prune others, so of several equal cliques
        // the first survives.
        for c1 in 0..self.cliques.len() {
            if pruned[c1] {
                continue;
            }
            self.set_current_clique(c1);
            for c2 in 0..self.cliques.len() {
                if c1 != c2 && !pruned[c2] && self.is_clique_dominated(c2) {
                    pruned[c2] = true;
                }
            }
        }
        pruned
    }
}

/// Returns the indices of the patterns that remain in use, in their original
/// order, and the remaining cliques renumbered to index into that list.
pub fn prune_dominated_subsets(
    patterns: &[Pattern],
    cliques: &[Vec<usize>],
    num_variables: usize,
) -> (Vec<usize>, Vec<Vec<usize>>) {
    let pruned = Pruner::new(patterns, cliques, num_variables).pruned_cliques();
    let mut in_use = vec![false; patterns.len()];
    for (clique, _) in cliques.iter().zip(&pruned).filter(|(_, &pruned)| !pruned) {
        for &pattern in clique {
            in_use[pattern] = true;
        }
    }
    let kept: Vec<usize> = (0..patterns.len()).filter(|&i| in_use[i]).collect();
    let mut new_index = vec![usize::MAX; patterns.len()];
    for (index, &old) in kept.iter().enumerate() {
        new_index[old] = index;
    }
    let remaining = cliques
        .iter()
        .zip(&pruned)
        .filter(|(_, &pruned)| !pruned)
        .map(|(clique, _)| clique.iter().map(|&pattern| new_index[pattern]).collect())
        .collect();
    (kept, remaining)
}
