use super::Heuristic;
use crate::graph::Graph;
use crate::solution::{Problem, Solution};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Greedy distance dominating set
///
/// Repeatedly selects the vertex whose k-ball covers the most undominated
/// vertices, then drops selected vertices that became redundant.
pub struct GreedyDominatingSet {
    pub distance: usize,
    pub randomized: bool,
    pub seed: u64,
}

impl GreedyDominatingSet {
    pub fn new(distance: usize) -> Self {
        GreedyDominatingSet {
            distance,
            randomized: false,
            seed: 42,
        }
    }

    pub fn randomized(distance: usize, seed: u64) -> Self {
        GreedyDominatingSet {
            distance,
            randomized: true,
            seed,
        }
    }

    /// Vertex indices of a dominating set
    pub fn select(&self, graph: &Graph) -> Vec<usize> {
        let n = graph.num_nodes();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let balls: Vec<Vec<usize>> = (0..n).map(|v| graph.ball(v, self.distance)).collect();

        let mut dominated = vec![false; n];
        let mut remaining = n;
        let mut chosen = Vec::new();

        while remaining > 0 {
            let gains: Vec<usize> = balls
                .iter()
                .map(|ball| ball.iter().filter(|&&u| !dominated[u]).count())
                .collect();
            let best_gain = gains.iter().copied().max().unwrap_or(0);
            if best_gain == 0 {
                break;
            }

            let best: Vec<usize> = (0..n).filter(|&v| gains[v] == best_gain).collect();
            let pick = if self.randomized && best.len() > 1 {
                best[rng.gen_range(0..best.len())]
            } else {
                best[0]
            };

            for &u in &balls[pick] {
                if !dominated[u] {
                    dominated[u] = true;
                    remaining -= 1;
                }
            }
            chosen.push(pick);
        }

        Self::prune(&balls, n, chosen)
    }

    /// Remove vertices whose whole ball is covered by the others
    fn prune(balls: &[Vec<usize>], n: usize, mut chosen: Vec<usize>) -> Vec<usize> {
        let mut multiplicity = vec![0usize; n];
        for &c in &chosen {
            for &u in &balls[c] {
                multiplicity[u] += 1;
            }
        }

        for pos in (0..chosen.len()).rev() {
            let c = chosen[pos];
            if balls[c].iter().all(|&u| multiplicity[u] > 1) {
                for &u in &balls[c] {
                    multiplicity[u] -= 1;
                }
                chosen.remove(pos);
            }
        }

        chosen.sort_unstable();
        chosen
    }
}

impl Heuristic for GreedyDominatingSet {
    fn solve(&self, graph: &Graph) -> Solution {
        let start = std::time::Instant::now();
        let chosen = self.select(graph);
        let problem = Problem::DistanceDomination { distance: self.distance };
        let mut solution = Solution::from_indices(graph, problem, &chosen, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        if self.randomized {
            "GreedyDominatingSet-Randomized"
        } else {
            "GreedyDominatingSet"
        }
    }
}

/// Multi-start greedy: deterministic run plus `runs` randomized runs, keeps the smallest set
pub struct MultiStartDominatingSet {
    pub distance: usize,
    pub runs: usize,
    pub seed: u64,
}

impl MultiStartDominatingSet {
    pub fn new(distance: usize, runs: usize) -> Self {
        MultiStartDominatingSet { distance, runs, seed: 42 }
    }
}

impl Heuristic for MultiStartDominatingSet {
    fn solve(&self, graph: &Graph) -> Solution {
        let start = std::time::Instant::now();
        let mut best = GreedyDominatingSet::new(self.distance).select(graph);

        for run in 0..self.runs {
            let candidate = GreedyDominatingSet::randomized(self.distance, self.seed + run as u64).select(graph);
            if candidate.len() < best.len() {
                best = candidate;
            }
        }

        let problem = Problem::DistanceDomination { distance: self.distance };
        let mut solution = Solution::from_indices(graph, problem, &best, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        solution
    }

    fn name(&self) -> &str {
        "MultiStartDominatingSet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::distance_dominates;

    #[test]
    fn test_greedy_is_always_valid() {
        let graphs = vec![
            Graph::path(10),
            Graph::cycle(9),
            Graph::grid_2d(5, 4),
            Graph::star(6),
            Graph::gnp_random(40, 0.08, 3),
        ];
        for graph in &graphs {
            for k in 0..3 {
                let sol = GreedyDominatingSet::new(k).solve(graph);
                assert!(sol.feasible, "{} k={}", graph.name, k);
                assert!(distance_dominates(graph, &sol.vertices, k));
            }
        }
    }

    #[test]
    fn test_greedy_known_values() {
        assert_eq!(GreedyDominatingSet::new(1).solve(&Graph::star(7)).size(), 1);
        assert_eq!(GreedyDominatingSet::new(1).solve(&Graph::complete(6)).size(), 1);
        assert_eq!(GreedyDominatingSet::new(2).solve(&Graph::grid_2d(3, 3)).size(), 1);
        assert_eq!(GreedyDominatingSet::new(0).solve(&Graph::path(4)).size(), 4);
    }

    #[test]
    fn test_prune_removes_redundant_vertices() {
        let path = Graph::path(3);
        let balls: Vec<Vec<usize>> = (0..3).map(|v| path.ball(v, 1)).collect();
        assert_eq!(GreedyDominatingSet::prune(&balls, 3, vec![0, 1, 2]), vec![1]);
    }

    #[test]
    fn test_multi_start_not_worse_than_single_run() {
        let graph = Graph::gnp_random(30, 0.1, 11);
        let single = GreedyDominatingSet::new(1).solve(&graph);
        let multi = MultiStartDominatingSet::new(1, 10).solve(&graph);
        assert!(multi.feasible);
        assert!(multi.size() <= single.size());
    }
}
