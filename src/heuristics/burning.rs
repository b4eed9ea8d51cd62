use super::Heuristic;
use crate::graph::Graph;
use crate::solution::{Problem, Solution};

/// Greedy ball-covering heuristic for graph burning
///
/// A sequence `x_1 .. x_B` burns the graph within `B` rounds exactly when the
/// balls `N_{B-i}[x_i]` cover every vertex. For increasing `B`, centres are
/// picked largest radius first, each time the vertex whose ball covers the
/// most still-uncovered vertices. The first `B` that covers the graph wins.
pub struct GreedyBurning;

impl GreedyBurning {
    pub fn new() -> Self {
        GreedyBurning
    }

    /// Vertex indices in ignition order
    pub fn sequence(&self, graph: &Graph) -> Vec<usize> {
        let n = graph.num_nodes();
        if n == 0 {
            return Vec::new();
        }

        let dist: Vec<Vec<Option<usize>>> = (0..n).map(|v| graph.bfs_distances(v, None)).collect();
        let lower = graph.num_components().max(n.min(2));

        for rounds in lower..=n {
            if let Some(seq) = Self::cover_with(&dist, rounds) {
                log::debug!("Greedy burning on '{}' found {} rounds", graph.name, rounds);
                return seq;
            }
        }

        // Igniting every vertex always works.
        (0..n).collect()
    }

    /// Try to cover all vertices with balls of radius `rounds-1, .., 0`
    fn cover_with(dist: &[Vec<Option<usize>>], rounds: usize) -> Option<Vec<usize>> {
        let n = dist.len();
        if rounds > n {
            return None;
        }

        let mut covered = vec![false; n];
        let mut chosen = vec![false; n];
        let mut seq = Vec::with_capacity(rounds);

        for i in 0..rounds {
            let radius = rounds - 1 - i;
            let within = |v: usize, u: usize| dist[v][u].map(|d| d <= radius).unwrap_or(false);

            let mut best: Option<(usize, usize)> = None;
            for v in (0..n).filter(|&v| !chosen[v]) {
                let gain = (0..n).filter(|&u| !covered[u] && within(v, u)).count();
                if best.map(|(_, g)| gain > g).unwrap_or(true) {
                    best = Some((v, gain));
                }
            }

            let (pick, _) = best?;
            for u in 0..n {
                if within(pick, u) {
                    covered[u] = true;
                }
            }
            chosen[pick] = true;
            seq.push(pick);
        }

        covered.iter().all(|&c| c).then_some(seq)
    }
}

impl Default for GreedyBurning {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for GreedyBurning {
    fn solve(&self, graph: &Graph) -> Solution {
        let start = std::time::Instant::now();
        let seq = self.sequence(graph);
        let mut solution = Solution::from_indices(graph, Problem::Burning, &seq, self.name());
        solution.lower_bound = Some(graph.num_components().max(graph.num_nodes().min(2)));
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "GreedyBurning"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::burns_within;

    #[test]
    fn test_greedy_burning_is_strictly_valid() {
        let graphs = vec![
            Graph::path(10),
            Graph::cycle(12),
            Graph::grid_2d(4, 4),
            Graph::star(9),
            Graph::complete(5),
            Graph::gnp_random(30, 0.1, 5),
        ];
        for graph in &graphs {
            let seq = GreedyBurning::new().sequence(graph);
            assert!(burns_within(graph, &seq), "{}", graph.name);
            let sol = GreedyBurning::new().solve(graph);
            assert!(sol.feasible);
        }
    }

    #[test]
    fn test_greedy_burning_small_cases() {
        assert_eq!(GreedyBurning::new().sequence(&Graph::complete(6)).len(), 2);
        assert_eq!(GreedyBurning::new().sequence(&Graph::star(5)).len(), 2);
        assert_eq!(GreedyBurning::new().sequence(&Graph::path(4)).len(), 2);
        assert_eq!(GreedyBurning::new().sequence(&Graph::path(1)).len(), 1);
        assert!(GreedyBurning::new().sequence(&Graph::new("empty")).is_empty());
    }

    #[test]
    fn test_isolated_vertices_need_one_round_each() {
        let mut graph = Graph::new("isolated");
        for label in ["a", "b", "c"] {
            graph.add_node(label);
        }
        assert_eq!(GreedyBurning::new().sequence(&graph).len(), 3);
    }
}
