//! Enumeration of all maximal cliques of an undirected graph, following
//! Tomita, Tanaka and Takahashi (2006): Bron-Kerbosch with a pivot that
//! covers the most candidates.

/// Returns every maximal clique of the graph given as adjacency lists (which
/// must be symmetric and free of self loops). Each clique is sorted. A graph
/// without vertices has exactly one maximal clique, the empty one.
pub fn compute_max_cliques(graph: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let neighbours: Vec<Vec<usize>> = graph
        .iter()
        .map(|adjacent| {
            let mut sorted = adjacent.clone();
            sorted.sort_unstable();
            sorted.dedup();
            sorted
        })
        .collect();
    let vertices: Vec<usize> = (0..graph.len()).collect();
    let mut cliques = Vec::new();
    let mut current = Vec::new();
    expand(&neighbours, &vertices, vertices.clone(), &mut current, &mut cliques);
    cliques
}

fn intersection(a: &[usize], b: &[usize]) -> Vec<usize> {
    a.iter()
        .filter(|x| b.binary_search(x).is_ok())
        .copied()
        .collect()
}

fn expand(
    neighbours: &[Vec<usize>],
    subgraph: &[usize],
    mut candidates: Vec<usize>,
    current: &mut Vec<usize>,
    cliques: &mut Vec<Vec<usize>>,
) {
    if subgraph.is_empty() {
        let mut clique = current.clone();
        clique.sort_unstable();
        cliques.push(clique);
        return;
    }

    let pivot = subgraph
        .iter()
        .copied()
        .max_by_key(|&u| intersection(&candidates, &neighbours[u]).len())
        .unwrap_or(subgraph[0]);
    let extensions: Vec<usize> = candidates
        .iter()
        .filter(|v| neighbours[pivot].binary_search(v).is_err())
        .copied()
        .collect();

    for vertex in extensions {
        current.push(vertex);
        let next_subgraph = intersection(subgraph, &neighbours[vertex]);
        let next_candidates = intersection(&candidates, &neighbours[vertex]);
        expand(neighbours, &next_subgraph, next_candidates, current, cliques);
        current.pop();
        candidates.retain(|&v| v != vertex);
    }
}
